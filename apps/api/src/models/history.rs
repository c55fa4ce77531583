use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::diagnosis::models::{Diagnosis, DurationBucket};

/// One persisted symptom submission and the diagnosis it produced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SymptomHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symptoms: String,
    pub age: Option<i32>,
    pub duration: String,
    pub diagnosis: Json<Diagnosis>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub user_id: Uuid,
    pub symptoms: String,
    pub age: Option<u32>,
    pub duration: DurationBucket,
    pub diagnosis: Diagnosis,
}

impl NewHistoryEntry {
    pub fn into_entry(self, id: Uuid, created_at: DateTime<Utc>) -> SymptomHistoryEntry {
        SymptomHistoryEntry {
            id,
            user_id: self.user_id,
            symptoms: self.symptoms,
            age: self.age.map(|a| a as i32),
            duration: self.duration.as_str().to_string(),
            diagnosis: Json(self.diagnosis),
            created_at,
        }
    }
}
