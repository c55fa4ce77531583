//! Storage seam for the two hosted tables, `users` and `symptoms_history`.
//!
//! `AppState` holds an `Arc<dyn Repository>`: `PgRepository` when a database
//! is configured, `MemoryRepository` otherwise (and in tests).

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::history::{NewHistoryEntry, SymptomHistoryEntry};
use crate::models::user::{NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Returned (inside `anyhow::Error`) by `create_user` when the email is taken,
/// including when a concurrent insert wins the race.
#[derive(Debug, Error)]
#[error("user with email {0} already exists")]
pub struct DuplicateEmail(pub String);

#[async_trait]
pub trait Repository: Send + Sync {
    /// Looks a user up by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Inserts a user. Fails with `DuplicateEmail` if the email is already taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Appends one history entry. Entries are never updated.
    async fn insert_history(&self, entry: NewHistoryEntry) -> Result<SymptomHistoryEntry>;

    /// Returns a user's history, newest first.
    async fn list_history(&self, user_id: Uuid) -> Result<Vec<SymptomHistoryEntry>>;
}
