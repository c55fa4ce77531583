use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::history::{NewHistoryEntry, SymptomHistoryEntry};
use crate::models::user::{NewUser, User};
use crate::repository::{DuplicateEmail, Repository};

/// Repository over the PostgreSQL pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (id, email, full_name, password_hash, oauth_provider, oauth_subject, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.oauth_provider)
        .bind(&user.oauth_subject)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                anyhow::Error::new(DuplicateEmail(user.email.clone()))
            }
            _ => anyhow::Error::new(e),
        })?;

        info!("Created user {} ({})", created.id, created.email);
        Ok(created)
    }

    async fn insert_history(&self, entry: NewHistoryEntry) -> Result<SymptomHistoryEntry> {
        let row = entry.into_entry(Uuid::new_v4(), Utc::now());

        // Append-only: history rows are INSERTed, never UPDATEd
        let saved = sqlx::query_as::<_, SymptomHistoryEntry>(
            r#"
            INSERT INTO symptoms_history
                (id, user_id, symptoms, age, duration, diagnosis, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.symptoms)
        .bind(row.age)
        .bind(&row.duration)
        .bind(&row.diagnosis)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn list_history(&self, user_id: Uuid) -> Result<Vec<SymptomHistoryEntry>> {
        Ok(sqlx::query_as::<_, SymptomHistoryEntry>(
            "SELECT * FROM symptoms_history WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
