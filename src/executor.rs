use tracing::{error, info, warn};

use crate::gmail::MailProvider;
use crate::rules::Action;

pub const UNREAD_LABEL: &str = "UNREAD";

/// Applies fired actions against the provider. Every failure here is
/// terminal to the single action only; the batch keeps moving.
pub struct ActionExecutor<'a, P: MailProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: MailProvider + ?Sized> ActionExecutor<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, action: &Action, message_id: &str) {
        match action {
            Action::MarkAsRead => self.mark_as_read(message_id).await,
            Action::MoveToLabel { label } => self.move_to_label(message_id, label).await,
        }
    }

    async fn mark_as_read(&self, message_id: &str) {
        match self.provider.remove_label(message_id, UNREAD_LABEL).await {
            Ok(()) => info!(message_id, "marked as read"),
            Err(e) => error!(message_id, error = %e, "failed to mark as read"),
        }
    }

    async fn move_to_label(&self, message_id: &str, label_name: &str) {
        let labels = match self.provider.list_labels().await {
            Ok(labels) => labels,
            Err(e) => {
                error!(message_id, error = %e, "failed to list labels");
                return;
            }
        };

        // Label names resolve case-insensitively; creation is out of scope.
        let wanted = label_name.to_lowercase();
        let Some(label) = labels.iter().find(|l| l.name.to_lowercase() == wanted) else {
            warn!(message_id, label_name, "label not found, skipping");
            return;
        };

        match self.provider.add_label(message_id, &label.id).await {
            Ok(()) => info!(message_id, label_name, "moved to label"),
            Err(e) => error!(message_id, label_name, error = %e, "failed to move to label"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Label, RemoteMessage};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        labels: Vec<Label>,
        fail_remove: bool,
        added: Mutex<Vec<(String, String)>>,
        removed: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MailProvider for FakeProvider {
        async fn get_message(&self, id: &str) -> Result<RemoteMessage> {
            Ok(RemoteMessage {
                id: id.to_string(),
                label_ids: vec![],
            })
        }

        async fn list_labels(&self) -> Result<Vec<Label>> {
            Ok(self.labels.clone())
        }

        async fn add_label(&self, id: &str, label_id: &str) -> Result<()> {
            self.added
                .lock()
                .unwrap()
                .push((id.to_string(), label_id.to_string()));
            Ok(())
        }

        async fn remove_label(&self, id: &str, label_id: &str) -> Result<()> {
            if self.fail_remove {
                return Err(anyhow!("provider unavailable"));
            }
            self.removed
                .lock()
                .unwrap()
                .push((id.to_string(), label_id.to_string()));
            Ok(())
        }
    }

    fn label(id: &str, name: &str) -> Label {
        Label {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn mark_as_read_removes_the_unread_label() {
        let provider = FakeProvider::default();
        let executor = ActionExecutor::new(&provider);

        executor.execute(&Action::MarkAsRead, "m1").await;

        assert_eq!(
            *provider.removed.lock().unwrap(),
            vec![("m1".to_string(), UNREAD_LABEL.to_string())]
        );
    }

    #[tokio::test]
    async fn move_to_label_resolves_names_case_insensitively() {
        let provider = FakeProvider {
            labels: vec![label("Label_7", "Newsletters"), label("Label_8", "Receipts")],
            ..Default::default()
        };
        let executor = ActionExecutor::new(&provider);

        executor
            .execute(
                &Action::MoveToLabel {
                    label: "newsletters".to_string(),
                },
                "m1",
            )
            .await;

        assert_eq!(
            *provider.added.lock().unwrap(),
            vec![("m1".to_string(), "Label_7".to_string())]
        );
    }

    #[tokio::test]
    async fn move_to_unknown_label_issues_no_mutation() {
        let provider = FakeProvider {
            labels: vec![label("Label_8", "Receipts")],
            ..Default::default()
        };
        let executor = ActionExecutor::new(&provider);

        executor
            .execute(
                &Action::MoveToLabel {
                    label: "Newsletters".to_string(),
                },
                "m1",
            )
            .await;

        assert!(provider.added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_swallowed() {
        let provider = FakeProvider {
            fail_remove: true,
            ..Default::default()
        };
        let executor = ActionExecutor::new(&provider);

        // Must not panic or propagate.
        executor.execute(&Action::MarkAsRead, "m1").await;

        assert!(provider.removed.lock().unwrap().is_empty());
    }
}
