use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::db::Database;
use crate::engine;
use crate::executor::ActionExecutor;
use crate::gmail::MailProvider;
use crate::models::Message;
use crate::rules::RuleSet;

/// Runs the rule set over every stored message once. Failures below the
/// whole-batch level (bad stored date, unreachable provider, failed action)
/// are logged and never abort the remaining messages.
pub async fn run<P: MailProvider + ?Sized>(
    db: &Database,
    provider: &P,
    rules: &RuleSet,
) -> Result<()> {
    let executor = ActionExecutor::new(provider);
    let emails = db.get_emails().await?;
    info!(count = emails.len(), "processing stored messages");

    for email in emails {
        info!(
            message_id = %email.id,
            from = %email.from_address,
            subject = %email.subject,
            "processing"
        );

        let date = match email.parsed_date() {
            Ok(date) => date,
            Err(e) => {
                warn!(
                    message_id = %email.id,
                    date = %email.date,
                    error = %e,
                    "unparsable stored date, skipping message"
                );
                continue;
            }
        };

        // Labels are never cached locally, so ask the provider for the
        // message's current set.
        let remote = match provider.get_message(&email.id).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(
                    message_id = %email.id,
                    error = %e,
                    "failed to fetch current labels, skipping message"
                );
                continue;
            }
        };

        let message = Message {
            id: email.id,
            from_address: email.from_address,
            subject: email.subject,
            date,
            labels: remote.label_ids.into_iter().collect(),
            snippet: email.snippet,
        };

        let now = Utc::now();
        for rule in &rules.rules {
            if engine::evaluate(rule, &message, now) {
                for action in &rule.actions {
                    executor.execute(action, &message.id).await;
                }
            }
        }
    }

    Ok(())
}
