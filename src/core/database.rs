// src/core/database.rs
//! SQLite-backed profile and note storage

use crate::linkedin::types::{EmploymentRecord, Note, ProfileRecord};
use crate::store::{ProfileStore, StoreError};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection with automatic setup
    pub async fn new(database_path: &Path) -> Result<Self> {
        crate::utils::ensure_parent_dir(database_path).await?;

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        Self::with_pool(pool).await
    }

    /// Private in-memory database; a single connection keeps every query on the same data
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let db = Self { pool };
        db.migrate().await.context("Database migration failed")?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                profile_url TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                current_title TEXT NOT NULL DEFAULT '',
                work_experience TEXT NOT NULL DEFAULT '[]',
                extracted_at TEXT NOT NULL,
                last_updated TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_url TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_profile_url ON notes(profile_url);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Row Models =====

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    profile_url: String,
    name: String,
    current_title: String,
    work_experience: String,
    extracted_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let work_experience: Vec<EmploymentRecord> = serde_json::from_str(&row.work_experience)?;
        Ok(ProfileRecord {
            name: row.name,
            profile_url: row.profile_url,
            current_title: row.current_title,
            work_experience,
            extracted_at: row.extracted_at,
            last_updated: row.last_updated,
        })
    }
}

const PROFILE_COLUMNS: &str =
    "profile_url, name, current_title, work_experience, extracted_at, last_updated";

const NOTE_COLUMNS: &str = "id, profile_url, content, created_at, updated_at";

// ===== Store implementation =====

impl ProfileStore for Database {
    async fn load_profiles(&self) -> Result<Vec<ProfileRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles ORDER BY rowid ASC",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProfileRecord::try_from).collect()
    }

    async fn load_profile(&self, profile_url: &str) -> Result<Option<ProfileRecord>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE profile_url = ?",
            PROFILE_COLUMNS
        ))
        .bind(profile_url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfileRecord::try_from).transpose()
    }

    async fn save_profile(&self, profile: &ProfileRecord) -> Result<(), StoreError> {
        let work_experience = serde_json::to_string(&profile.work_experience)?;

        sqlx::query(
            r#"
            INSERT INTO profiles (profile_url, name, current_title, work_experience, extracted_at, last_updated)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(profile_url) DO UPDATE SET
                name = excluded.name,
                current_title = excluded.current_title,
                work_experience = excluded.work_experience,
                extracted_at = excluded.extracted_at,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&profile.profile_url)
        .bind(&profile.name)
        .bind(&profile.current_title)
        .bind(work_experience)
        .bind(profile.extracted_at)
        .bind(profile.last_updated)
        .execute(&self.pool)
        .await?;

        info!("Saved profile {} ({})", profile.name, profile.profile_url);
        Ok(())
    }

    async fn delete_profile(&self, profile_url: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM notes WHERE profile_url = ?")
            .bind(profile_url)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM profiles WHERE profile_url = ?")
            .bind(profile_url)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted profile {}", profile_url);
        }
        Ok(deleted)
    }

    async fn load_notes(&self) -> Result<HashMap<String, Vec<Note>>, StoreError> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {} FROM notes ORDER BY id ASC",
            NOTE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<String, Vec<Note>> = HashMap::new();
        for note in notes {
            grouped.entry(note.profile_url.clone()).or_default().push(note);
        }
        Ok(grouped)
    }

    async fn notes_for(&self, profile_url: &str) -> Result<Vec<Note>, StoreError> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {} FROM notes WHERE profile_url = ? ORDER BY id ASC",
            NOTE_COLUMNS
        ))
        .bind(profile_url)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    async fn add_note(
        &self,
        profile_url: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Note, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notes (profile_url, content, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(profile_url)
        .bind(content)
        .bind(at)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(Note {
            id: result.last_insert_rowid(),
            profile_url: profile_url.to_string(),
            content: content.to_string(),
            created_at: at,
            updated_at: at,
        })
    }

    async fn update_note(
        &self,
        profile_url: &str,
        id: i64,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes SET content = ?, updated_at = ? WHERE id = ? AND profile_url = ? RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(content)
        .bind(at)
        .bind(id)
        .bind(profile_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    async fn delete_note(&self, profile_url: &str, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND profile_url = ?")
            .bind(id)
            .bind(profile_url)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_notes(&self, profile_url: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE profile_url = ?")
            .bind(profile_url)
            .execute(&self.pool)
            .await?;

        info!("Cleared {} notes of {}", result.rows_affected(), profile_url);
        Ok(result.rows_affected())
    }
}
