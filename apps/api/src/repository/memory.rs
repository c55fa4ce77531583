use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::history::{NewHistoryEntry, SymptomHistoryEntry};
use crate::models::user::{NewUser, User};
use crate::repository::{DuplicateEmail, Repository};

/// Process-local repository. Data is lost on restart.
#[derive(Default)]
pub struct MemoryRepository {
    users: RwLock<Vec<User>>,
    history: RwLock<Vec<SymptomHistoryEntry>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DuplicateEmail(user.email).into());
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            oauth_provider: user.oauth_provider,
            oauth_subject: user.oauth_subject,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn insert_history(&self, entry: NewHistoryEntry) -> Result<SymptomHistoryEntry> {
        let users = self.users.read().await;
        if !users.iter().any(|u| u.id == entry.user_id) {
            bail!("user {} does not exist", entry.user_id);
        }
        let row = entry.into_entry(Uuid::new_v4(), Utc::now());
        self.history.write().await.push(row.clone());
        Ok(row)
    }

    async fn list_history(&self, user_id: Uuid) -> Result<Vec<SymptomHistoryEntry>> {
        let mut entries: Vec<_> = self
            .history
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::fallback::generic_fallback;
    use crate::diagnosis::models::DurationBucket;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password_hash: None,
            oauth_provider: None,
            oauth_subject: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = MemoryRepository::new();
        repo.create_user(new_user("a@example.com")).await.unwrap();
        let err = repo.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(err.downcast_ref::<DuplicateEmail>().is_some());
    }

    #[tokio::test]
    async fn test_history_requires_existing_user() {
        let repo = MemoryRepository::new();
        let result = repo
            .insert_history(NewHistoryEntry {
                user_id: Uuid::new_v4(),
                symptoms: "cough".to_string(),
                age: None,
                duration: DurationBucket::default(),
                diagnosis: generic_fallback(),
            })
            .await;
        assert!(result.is_err());
        assert_eq!(repo.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_history_is_scoped_to_user() {
        let repo = MemoryRepository::new();
        let alice = repo.create_user(new_user("alice@example.com")).await.unwrap();
        let bob = repo.create_user(new_user("bob@example.com")).await.unwrap();

        for (user, symptoms) in [(&alice, "cough"), (&alice, "fever"), (&bob, "headache")] {
            repo.insert_history(NewHistoryEntry {
                user_id: user.id,
                symptoms: symptoms.to_string(),
                age: Some(40),
                duration: DurationBucket::OneToThreeDays,
                diagnosis: generic_fallback(),
            })
            .await
            .unwrap();
        }

        let alice_history = repo.list_history(alice.id).await.unwrap();
        assert_eq!(alice_history.len(), 2);
        assert!(alice_history.iter().all(|e| e.user_id == alice.id));
        assert!(alice_history[0].created_at >= alice_history[1].created_at);
    }
}
