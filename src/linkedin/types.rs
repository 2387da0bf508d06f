// src/linkedin/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One employment stint as read from the page. `duration` stays raw and is
/// re-parsed whenever it is compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentRecord {
    pub company: String,
    pub title: String,
    pub duration: String,
    pub location: String,
    pub description: String,
}

/// A saved profile, keyed by `profile_url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub name: String,
    pub profile_url: String,
    pub current_title: String,
    #[serde(default)]
    pub work_experience: Vec<EmploymentRecord>,
    pub extracted_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ProfileRecord {
    /// Name and URL are the minimum needed to persist a profile
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty() && !self.profile_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub profile_url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
