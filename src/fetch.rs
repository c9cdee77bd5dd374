use anyhow::Result;
use tracing::{info, warn};

use crate::db::Database;
use crate::gmail::GmailClient;

const INBOX: &str = "INBOX";
const PAGE_SIZE: u32 = 100;

/// Pulls INBOX message summaries into the local store, following page tokens
/// until the listing is exhausted. A failed per-message fetch is logged and
/// skipped; a failed listing aborts the run.
pub async fn run(client: &GmailClient, db: &Database) -> Result<()> {
    let mut page_token = None;
    let mut stored = 0usize;

    loop {
        let (ids, next) = client
            .list_messages(vec![INBOX.to_string()], PAGE_SIZE, page_token)
            .await?;

        for id in &ids {
            match client.fetch_summary(id).await {
                Ok(email) => {
                    db.upsert_email(&email).await?;
                    stored += 1;
                }
                Err(e) => warn!(message_id = %id, error = %e, "skipping message"),
            }
        }

        match next {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(stored, "fetch complete");
    Ok(())
}
