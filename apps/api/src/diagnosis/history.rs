//! Best-effort history writes that trail a successful diagnosis.
//!
//! `record` spawns one task per entry and returns immediately. A failed write
//! is logged and reported on the failure channel; it never reaches the
//! diagnosis caller. There is no retry and no ordering between writes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::history::NewHistoryEntry;
use crate::repository::Repository;

/// A history write that did not land.
#[derive(Debug, Clone)]
pub struct HistoryWriteFailure {
    pub user_id: Uuid,
    pub error: String,
}

#[derive(Clone)]
pub struct HistoryWriter {
    repo: Arc<dyn Repository>,
    failures: mpsc::UnboundedSender<HistoryWriteFailure>,
}

impl HistoryWriter {
    /// Returns the writer and the receiving end of its failure channel.
    pub fn new(
        repo: Arc<dyn Repository>,
    ) -> (Self, mpsc::UnboundedReceiver<HistoryWriteFailure>) {
        let (failures, rx) = mpsc::unbounded_channel();
        (Self { repo, failures }, rx)
    }

    /// Appends the entry in the background. The handle may be dropped.
    pub fn record(&self, entry: NewHistoryEntry) -> JoinHandle<()> {
        let repo = Arc::clone(&self.repo);
        let failures = self.failures.clone();
        let user_id = entry.user_id;

        tokio::spawn(async move {
            match repo.insert_history(entry).await {
                Ok(saved) => debug!("Saved history entry {} for user {user_id}", saved.id),
                Err(e) => {
                    warn!("Failed to save symptom history for user {user_id}: {e:#}");
                    // Receiver gone means nobody is draining; the warn above is enough.
                    let _ = failures.send(HistoryWriteFailure {
                        user_id,
                        error: format!("{e:#}"),
                    });
                }
            }
        })
    }
}

/// Drains the failure channel until every writer is dropped.
pub async fn log_history_failures(mut rx: mpsc::UnboundedReceiver<HistoryWriteFailure>) {
    let mut total = 0_u64;
    while let Some(failure) = rx.recv().await {
        total += 1;
        warn!(
            "History write failure #{total} for user {}: {}",
            failure.user_id, failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::fallback::generic_fallback;
    use crate::diagnosis::models::DurationBucket;
    use crate::models::user::NewUser;
    use crate::repository::MemoryRepository;

    fn entry(user_id: Uuid) -> NewHistoryEntry {
        NewHistoryEntry {
            user_id,
            symptoms: "headache".to_string(),
            age: Some(30),
            duration: DurationBucket::OneToThreeDays,
            diagnosis: generic_fallback(),
        }
    }

    #[tokio::test]
    async fn test_successful_write_lands_and_reports_nothing() {
        let repo = Arc::new(MemoryRepository::new());
        let user = repo
            .create_user(NewUser {
                email: "writer@example.com".to_string(),
                full_name: "Writer".to_string(),
                password_hash: None,
                oauth_provider: None,
                oauth_subject: None,
            })
            .await
            .unwrap();
        let (writer, mut failures) = HistoryWriter::new(repo.clone());

        writer.record(entry(user.id)).await.unwrap();

        assert_eq!(repo.history_len().await, 1);
        assert!(failures.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_write_is_reported_on_channel() {
        let repo = Arc::new(MemoryRepository::new());
        let (writer, mut failures) = HistoryWriter::new(repo.clone());
        let ghost = Uuid::new_v4();

        // Unknown user: the repository refuses the row.
        writer.record(entry(ghost)).await.unwrap();

        let failure = failures.try_recv().unwrap();
        assert_eq!(failure.user_id, ghost);
        assert!(failure.error.contains("does not exist"));
        assert_eq!(repo.history_len().await, 0);
    }
}
