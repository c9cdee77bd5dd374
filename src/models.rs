use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Textual timestamp layout used by the `emails` table,
/// e.g. `Tue, 01 Apr 2025 10:00:00 +0000`.
pub const WIRE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredEmail {
    pub id: String,
    pub from_address: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
}

impl StoredEmail {
    pub fn parsed_date(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_str(&self.date, WIRE_DATE_FORMAT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

/// Provider-side view of a message. Labels are never cached locally and may
/// have changed since the message was ingested.
#[derive(Debug, Clone)]
pub struct RemoteMessage {
    pub id: String,
    pub label_ids: Vec<String>,
}

/// A stored message joined with its current label set, ready for rule
/// evaluation.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub from_address: String,
    pub subject: String,
    pub date: DateTime<FixedOffset>,
    pub labels: HashSet<String>,
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_date() {
        let email = StoredEmail {
            id: "m1".to_string(),
            from_address: "a@b.c".to_string(),
            subject: "hi".to_string(),
            date: "Tue, 01 Apr 2025 10:00:00 +0200".to_string(),
            snippet: String::new(),
        };
        let date = email.parsed_date().unwrap();
        assert_eq!(date.to_rfc3339(), "2025-04-01T10:00:00+02:00");
    }

    #[test]
    fn rejects_legacy_placeholder_date() {
        let email = StoredEmail {
            id: "m1".to_string(),
            from_address: "a@b.c".to_string(),
            subject: "hi".to_string(),
            date: "No Date".to_string(),
            snippet: String::new(),
        };
        assert!(email.parsed_date().is_err());
    }
}
