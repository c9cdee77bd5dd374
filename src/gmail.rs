use anyhow::{Context, Result};
use async_trait::async_trait;
use google_gmail1::Gmail;
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;

use crate::models::{Label, RemoteMessage, StoredEmail};

/// The four provider operations the rule pipeline depends on. Anything
/// exposing these can stand in for Gmail, which keeps the engine and executor
/// testable without network access.
#[async_trait]
pub trait MailProvider {
    async fn get_message(&self, id: &str) -> Result<RemoteMessage>;
    async fn list_labels(&self) -> Result<Vec<Label>>;
    async fn add_label(&self, id: &str, label_id: &str) -> Result<()>;
    async fn remove_label(&self, id: &str, label_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct GmailClient {
    hub: Gmail<HttpsConnector<HttpConnector>>,
}

impl GmailClient {
    pub fn new(hub: Gmail<HttpsConnector<HttpConnector>>) -> Self {
        Self { hub }
    }

    pub async fn list_messages(
        &self,
        label_ids: Vec<String>,
        max_results: u32,
        page_token: Option<String>,
    ) -> Result<(Vec<String>, Option<String>)> {
        let mut req = self
            .hub
            .users()
            .messages_list("me")
            .max_results(max_results);

        for label_id in &label_ids {
            req = req.add_label_ids(label_id);
        }

        if let Some(token) = &page_token {
            req = req.page_token(token);
        }

        let (_, message_list) = req.doit().await.context("Failed to list messages")?;

        let ids = message_list
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        Ok((ids, message_list.next_page_token))
    }

    /// Fetches the header summary that gets persisted to the store. Absent
    /// headers fall back to the legacy placeholder values.
    pub async fn fetch_summary(&self, id: &str) -> Result<StoredEmail> {
        let (_, msg) = self
            .hub
            .users()
            .messages_get("me", id)
            .format("metadata")
            .add_metadata_headers("From")
            .add_metadata_headers("Subject")
            .add_metadata_headers("Date")
            .doit()
            .await
            .context(format!("Failed to get message {}", id))?;

        let mut from = None;
        let mut subject = None;
        let mut date = None;

        if let Some(payload) = &msg.payload {
            if let Some(headers) = &payload.headers {
                for header in headers {
                    match header.name.as_deref() {
                        Some("From") => from = header.value.clone(),
                        Some("Subject") => subject = header.value.clone(),
                        Some("Date") => date = header.value.clone(),
                        _ => {}
                    }
                }
            }
        }

        Ok(StoredEmail {
            id: msg.id.unwrap_or_else(|| id.to_string()),
            from_address: from.unwrap_or_else(|| "Unknown".to_string()),
            subject: subject.unwrap_or_else(|| "No Subject".to_string()),
            date: date.unwrap_or_else(|| "No Date".to_string()),
            snippet: msg.snippet.unwrap_or_else(|| "No Snippet".to_string()),
        })
    }
}

#[async_trait]
impl MailProvider for GmailClient {
    async fn get_message(&self, id: &str) -> Result<RemoteMessage> {
        let (_, msg) = self
            .hub
            .users()
            .messages_get("me", id)
            .format("minimal")
            .doit()
            .await
            .context(format!("Failed to get message {}", id))?;

        Ok(RemoteMessage {
            id: msg.id.unwrap_or_else(|| id.to_string()),
            label_ids: msg.label_ids.unwrap_or_default(),
        })
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        let (_, label_list) = self
            .hub
            .users()
            .labels_list("me")
            .doit()
            .await
            .context("Failed to list labels")?;

        let labels = label_list
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|l| Label {
                id: l.id.unwrap_or_default(),
                name: l.name.unwrap_or_default(),
            })
            .collect();

        Ok(labels)
    }

    async fn add_label(&self, id: &str, label_id: &str) -> Result<()> {
        let req = google_gmail1::api::ModifyMessageRequest {
            add_label_ids: Some(vec![label_id.to_string()]),
            remove_label_ids: None,
        };
        self.hub
            .users()
            .messages_modify(req, "me", id)
            .doit()
            .await
            .context(format!("Failed to add label {} to message {}", label_id, id))?;
        Ok(())
    }

    async fn remove_label(&self, id: &str, label_id: &str) -> Result<()> {
        let req = google_gmail1::api::ModifyMessageRequest {
            add_label_ids: None,
            remove_label_ids: Some(vec![label_id.to_string()]),
        };
        self.hub
            .users()
            .messages_modify(req, "me", id)
            .doit()
            .await
            .context(format!(
                "Failed to remove label {} from message {}",
                label_id, id
            ))?;
        Ok(())
    }
}
