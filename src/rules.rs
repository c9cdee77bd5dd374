use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// A bad rules document aborts the run before any message is touched, so the
/// loader distinguishes a missing file from a malformed one.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed rules file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub predicate: RulePredicate,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

/// Combinator over a rule's conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RulePredicate {
    All,
    Any,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub field: Field,
    pub predicate: Predicate,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Field {
    From,
    Subject,
    Labels,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Predicate {
    Contains,
    Equals,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    MarkAsRead,
    MoveToLabel { label: String },
}

impl RuleSet {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| RulesError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "rules": [
            {
                "predicate": "All",
                "conditions": [
                    { "field": "From", "predicate": "Contains", "value": "newsletter" },
                    { "field": "Date", "predicate": "Last", "value": "30d" }
                ],
                "actions": [
                    { "action": "mark_as_read" },
                    { "action": "move_to_label", "label": "Newsletters" }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_sample_document() {
        let set: RuleSet = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(set.rules.len(), 1);

        let rule = &set.rules[0];
        assert_eq!(rule.predicate, RulePredicate::All);
        assert_eq!(rule.conditions.len(), 2);
        assert_eq!(rule.conditions[0].field, Field::From);
        assert_eq!(rule.conditions[0].predicate, Predicate::Contains);
        assert_eq!(rule.conditions[1].predicate, Predicate::Last);
        assert_eq!(
            rule.actions,
            vec![
                Action::MarkAsRead,
                Action::MoveToLabel {
                    label: "Newsletters".to_string()
                }
            ]
        );
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let set = RuleSet::load(file.path()).unwrap();
        assert_eq!(set.rules.len(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = RuleSet::load("definitely/not/here/rules.json").unwrap_err();
        assert!(matches!(err, RulesError::Read { .. }));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ \"rules\": [ { \"predicate\": \"Sometimes\" } ] }")
            .unwrap();

        let err = RuleSet::load(file.path()).unwrap_err();
        assert!(matches!(err, RulesError::Parse { .. }));
    }

    #[test]
    fn unknown_field_name_fails_fast() {
        let doc = r#"{ "rules": [ { "predicate": "All", "conditions": [
            { "field": "Body", "predicate": "Contains", "value": "x" } ], "actions": [] } ] }"#;
        assert!(serde_json::from_str::<RuleSet>(doc).is_err());
    }
}
