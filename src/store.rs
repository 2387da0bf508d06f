// src/store.rs
//! Persistence boundary for saved profiles and their notes

use crate::linkedin::types::{Note, ProfileRecord};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store can no longer be reached (e.g. its host context was torn down)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value style store keyed by profile URL. Saving an existing URL
/// replaces the stored record.
#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    /// All saved profiles, oldest first
    async fn load_profiles(&self) -> Result<Vec<ProfileRecord>, StoreError>;

    async fn load_profile(&self, profile_url: &str) -> Result<Option<ProfileRecord>, StoreError>;

    async fn save_profile(&self, profile: &ProfileRecord) -> Result<(), StoreError>;

    /// Removes the profile and every note attached to it
    async fn delete_profile(&self, profile_url: &str) -> Result<bool, StoreError>;

    async fn load_notes(&self) -> Result<HashMap<String, Vec<Note>>, StoreError>;

    async fn notes_for(&self, profile_url: &str) -> Result<Vec<Note>, StoreError>;

    async fn add_note(
        &self,
        profile_url: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Note, StoreError>;

    /// Replaces the content of note `id` of `profile_url`. `None` when the
    /// profile has no such note.
    async fn update_note(
        &self,
        profile_url: &str,
        id: i64,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Note>, StoreError>;

    async fn delete_note(&self, profile_url: &str, id: i64) -> Result<bool, StoreError>;

    /// Removes every note of `profile_url`, returning how many were removed
    async fn clear_notes(&self, profile_url: &str) -> Result<u64, StoreError>;
}

/// In-process store. Can be switched into a failing state to exercise
/// error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: RwLock<Vec<ProfileRecord>>,
    notes: RwLock<Vec<Note>>,
    next_note_id: AtomicI64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "store context invalidated".to_string(),
            ));
        }
        Ok(())
    }
}

impl ProfileStore for MemoryStore {
    async fn load_profiles(&self) -> Result<Vec<ProfileRecord>, StoreError> {
        self.check_available()?;
        Ok(self.profiles.read().await.clone())
    }

    async fn load_profile(&self, profile_url: &str) -> Result<Option<ProfileRecord>, StoreError> {
        self.check_available()?;
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.profile_url == profile_url).cloned())
    }

    async fn save_profile(&self, profile: &ProfileRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut profiles = self.profiles.write().await;
        match profiles
            .iter_mut()
            .find(|p| p.profile_url == profile.profile_url)
        {
            Some(existing) => *existing = profile.clone(),
            None => profiles.push(profile.clone()),
        }
        Ok(())
    }

    async fn delete_profile(&self, profile_url: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.profile_url != profile_url);
        self.notes
            .write()
            .await
            .retain(|n| n.profile_url != profile_url);
        Ok(profiles.len() < before)
    }

    async fn load_notes(&self) -> Result<HashMap<String, Vec<Note>>, StoreError> {
        self.check_available()?;
        let mut grouped: HashMap<String, Vec<Note>> = HashMap::new();
        for note in self.notes.read().await.iter() {
            grouped
                .entry(note.profile_url.clone())
                .or_default()
                .push(note.clone());
        }
        Ok(grouped)
    }

    async fn notes_for(&self, profile_url: &str) -> Result<Vec<Note>, StoreError> {
        self.check_available()?;
        let notes = self.notes.read().await;
        Ok(notes
            .iter()
            .filter(|n| n.profile_url == profile_url)
            .cloned()
            .collect())
    }

    async fn add_note(
        &self,
        profile_url: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Note, StoreError> {
        self.check_available()?;
        let note = Note {
            id: self.next_note_id.fetch_add(1, Ordering::SeqCst) + 1,
            profile_url: profile_url.to_string(),
            content: content.to_string(),
            created_at: at,
            updated_at: at,
        };
        self.notes.write().await.push(note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        profile_url: &str,
        id: i64,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Note>, StoreError> {
        self.check_available()?;
        let mut notes = self.notes.write().await;
        let updated = notes
            .iter_mut()
            .find(|n| n.id == id && n.profile_url == profile_url)
            .map(|note| {
                note.content = content.to_string();
                note.updated_at = at;
                note.clone()
            });
        Ok(updated)
    }

    async fn delete_note(&self, profile_url: &str, id: i64) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| !(n.id == id && n.profile_url == profile_url));
        Ok(notes.len() < before)
    }

    async fn clear_notes(&self, profile_url: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.profile_url != profile_url);
        Ok((before - notes.len()) as u64)
    }
}
