use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::models::Message;
use crate::rules::{Condition, Field, Predicate, Rule, RulePredicate};

/// Returns true when the rule fires for this message. `now` is passed in so
/// date-window conditions can be evaluated against a pinned clock in tests.
pub fn evaluate(rule: &Rule, message: &Message, now: DateTime<Utc>) -> bool {
    match rule.predicate {
        RulePredicate::All => rule
            .conditions
            .iter()
            .all(|c| evaluate_condition(c, message, now)),
        RulePredicate::Any => rule
            .conditions
            .iter()
            .any(|c| evaluate_condition(c, message, now)),
    }
}

pub fn evaluate_condition(condition: &Condition, message: &Message, now: DateTime<Utc>) -> bool {
    match (condition.field, condition.predicate) {
        (Field::From, Predicate::Contains) => message.from_address.contains(&condition.value),
        (Field::From, Predicate::Equals) => message.from_address == condition.value,
        (Field::Subject, Predicate::Contains) => message.subject.contains(&condition.value),
        (Field::Subject, Predicate::Equals) => message.subject == condition.value,
        (Field::Labels, Predicate::Contains) => {
            message.labels.contains(&condition.value.to_uppercase())
        }
        (Field::Date, Predicate::Last) => within_window(message, &condition.value, now),
        // Unsupported combinations are a documented no-op, not an error.
        _ => false,
    }
}

fn within_window(message: &Message, spec: &str, now: DateTime<Utc>) -> bool {
    match parse_window(spec) {
        Ok(window) => message.date.with_timezone(&Utc) >= now - window,
        Err(reason) => {
            warn!(
                message_id = %message.id,
                spec,
                reason,
                "unusable date window, treating condition as false"
            );
            false
        }
    }
}

/// Parses a window spec of the form `<amount><unit>`, e.g. `7d` or `12h`.
fn parse_window(spec: &str) -> Result<Duration, &'static str> {
    let unit = spec.chars().last().ok_or("empty window spec")?;
    let amount: i64 = spec[..spec.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| "window amount is not an integer")?;
    if amount < 0 {
        return Err("window amount is negative");
    }
    match unit {
        'd' => Duration::try_days(amount).ok_or("window amount out of range"),
        'h' => Duration::try_hours(amount).ok_or("window amount out of range"),
        _ => Err("unsupported window unit (expected 'd' or 'h')"),
    }
}
