// src/service.rs
//! Extract-save-match pipeline on top of a profile store.
//!
//! Parsing never fails; only store calls can abort an operation, and they are
//! reported once and never retried.

use crate::core::clock::Clock;
use crate::linkedin::{Note, ProfileDocument, ProfileExtractor, ProfileRecord};
use crate::matching::{group_by_person, DurationParser, OverlapMatcher, PersonMatches};
use crate::search::{self, SearchHit, Stats};
use crate::store::{ProfileStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Could not extract a profile name and URL from this page")]
    MissingIdentity,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// No saved profiles, or the current page lists no experience
    NotEnoughData,
    Matches(Vec<PersonMatches>),
}

/// Result of writing a note
#[derive(Debug, Clone, PartialEq)]
pub enum NoteChange {
    Saved(Note),
    /// Blank content removed this many notes
    Removed(u64),
    /// The profile has no note with that id
    Missing,
}

pub struct ProfileService<S> {
    store: S,
    clock: Arc<dyn Clock>,
    extractor: ProfileExtractor,
    matcher: OverlapMatcher,
}

impl<S: ProfileStore> ProfileService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            matcher: OverlapMatcher::new(DurationParser::new(clock.clone())),
            extractor: ProfileExtractor::new(),
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn extract(&self, doc: &ProfileDocument) -> ProfileRecord {
        self.extractor.extract(doc, self.clock.now())
    }

    /// Extract the page's profile and save it, replacing any earlier save of the same URL
    pub async fn save_current(&self, doc: &ProfileDocument) -> Result<ProfileRecord, ServiceError> {
        let mut profile = self.extract(doc);
        if !profile.has_identity() {
            warn!("Refusing to save profile from {}: no name or URL", doc.location());
            return Err(ServiceError::MissingIdentity);
        }

        profile.last_updated = self.clock.now();
        self.store
            .save_profile(&profile)
            .await
            .map_err(|e| report("save profile", e))?;

        info!("{} has been saved", profile.name);
        Ok(profile)
    }

    /// Saved people who overlapped with the page's profile at the same company
    pub async fn find_shared_history(
        &self,
        doc: &ProfileDocument,
    ) -> Result<MatchOutcome, ServiceError> {
        let current = self.extract(doc);
        let saved = self
            .store
            .load_profiles()
            .await
            .map_err(|e| report("load saved profiles", e))?;
        Ok(self.match_against(&current, &saved))
    }

    pub fn match_against(&self, current: &ProfileRecord, saved: &[ProfileRecord]) -> MatchOutcome {
        if saved.is_empty() || current.work_experience.is_empty() {
            warn!(
                "Search stopped: {} saved profiles, {} current experiences",
                saved.len(),
                current.work_experience.len()
            );
            return MatchOutcome::NotEnoughData;
        }

        let matches = self.matcher.find_overlaps(current, saved);
        info!("Found {} overlapping experiences", matches.len());
        MatchOutcome::Matches(group_by_person(matches))
    }

    pub async fn list_profiles(&self) -> Result<Vec<ProfileRecord>, ServiceError> {
        self.store
            .load_profiles()
            .await
            .map_err(|e| report("list profiles", e))
    }

    pub async fn delete_profile(&self, profile_url: &str) -> Result<bool, ServiceError> {
        self.store
            .delete_profile(profile_url)
            .await
            .map_err(|e| report("delete profile", e))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        let profiles = self.list_profiles().await?;
        let notes = self
            .store
            .load_notes()
            .await
            .map_err(|e| report("load notes", e))?;
        Ok(search::search_profiles(&profiles, &notes, query))
    }

    pub async fn stats(&self) -> Result<Stats, ServiceError> {
        let profiles = self.list_profiles().await?;
        let notes = self
            .store
            .load_notes()
            .await
            .map_err(|e| report("load notes", e))?;
        Ok(search::stats(&profiles, &notes))
    }

    pub async fn profile(&self, profile_url: &str) -> Result<Option<ProfileRecord>, ServiceError> {
        self.store
            .load_profile(profile_url)
            .await
            .map_err(|e| report("load profile", e))
    }

    /// Saving blank text clears every note of the profile
    pub async fn add_note(&self, profile_url: &str, content: &str) -> Result<NoteChange, ServiceError> {
        let content = content.trim();
        if content.is_empty() {
            let removed = self.clear_notes(profile_url).await?;
            return Ok(NoteChange::Removed(removed));
        }
        let note = self
            .store
            .add_note(profile_url, content, self.clock.now())
            .await
            .map_err(|e| report("add note", e))?;
        Ok(NoteChange::Saved(note))
    }

    /// Replaces the text of one note; blank text deletes it
    pub async fn edit_note(
        &self,
        profile_url: &str,
        id: i64,
        content: &str,
    ) -> Result<NoteChange, ServiceError> {
        let content = content.trim();
        if content.is_empty() {
            let deleted = self
                .store
                .delete_note(profile_url, id)
                .await
                .map_err(|e| report("delete note", e))?;
            return Ok(if deleted {
                NoteChange::Removed(1)
            } else {
                NoteChange::Missing
            });
        }

        let updated = self
            .store
            .update_note(profile_url, id, content, self.clock.now())
            .await
            .map_err(|e| report("update note", e))?;
        Ok(updated.map_or(NoteChange::Missing, NoteChange::Saved))
    }

    pub async fn clear_notes(&self, profile_url: &str) -> Result<u64, ServiceError> {
        let removed = self
            .store
            .clear_notes(profile_url)
            .await
            .map_err(|e| report("clear notes", e))?;
        info!("Cleared {} notes of {}", removed, profile_url);
        Ok(removed)
    }

    pub async fn notes_for(&self, profile_url: &str) -> Result<Vec<Note>, ServiceError> {
        self.store
            .notes_for(profile_url)
            .await
            .map_err(|e| report("load notes", e))
    }
}

fn report(operation: &str, e: StoreError) -> ServiceError {
    error!("Failed to {}: {}", operation, e);
    ServiceError::Store(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn service() -> ProfileService<MemoryStore> {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        ProfileService::new(MemoryStore::new(), Arc::new(FixedClock(now)))
    }

    fn page(slug: &str, name: &str, company: &str, duration: &str) -> ProfileDocument {
        let html = format!(
            r#"<html><head><title>{name} | LinkedIn</title></head><body>
            <h1>{name}</h1>
            <section><div id="experience"></div><div><ul><li>
              <span aria-hidden="true">Engineer</span>
              <span aria-hidden="true">{company} · Full-time</span>
              <span aria-hidden="true">{duration}</span>
            </li></ul></div></section>
            </body></html>"#
        );
        ProfileDocument::parse(&format!("https://www.linkedin.com/in/{slug}/"), &html)
    }

    #[tokio::test]
    async fn test_save_then_match() {
        let service = service();
        let saved = service
            .save_current(&page("sam", "Sam Hill", "Acme Inc.", "Jan 2019 - Dec 2020"))
            .await
            .unwrap();
        assert_eq!(saved.profile_url, "https://www.linkedin.com/in/sam/");

        let outcome = service
            .find_shared_history(&page("cara", "Cara Diaz", "ACME, LLC", "Jun 2020 - Present"))
            .await
            .unwrap();

        let MatchOutcome::Matches(people) = outcome else {
            panic!("expected matches");
        };
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Sam Hill");
        let window = people[0].experiences[0].overlap;
        assert_eq!(window.start.date(), NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
    }

    #[tokio::test]
    async fn test_matching_own_saved_page_finds_nothing() {
        let service = service();
        let doc = page("sam", "Sam Hill", "Acme", "Jan 2019 - Dec 2020");
        service.save_current(&doc).await.unwrap();
        assert_eq!(
            service.find_shared_history(&doc).await.unwrap(),
            MatchOutcome::Matches(vec![])
        );
    }

    #[tokio::test]
    async fn test_not_enough_data() {
        let service = service();
        let doc = page("cara", "Cara Diaz", "Acme", "Jun 2020 - Present");
        assert_eq!(
            service.find_shared_history(&doc).await.unwrap(),
            MatchOutcome::NotEnoughData
        );
    }

    #[tokio::test]
    async fn test_save_without_identity_is_refused() {
        let service = service();
        let doc = ProfileDocument::parse("https://example.com/about", "<html><body></body></html>");
        assert!(matches!(
            service.save_current(&doc).await,
            Err(ServiceError::MissingIdentity)
        ));
        assert!(service.list_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_and_keeps_state() {
        let service = service();
        service
            .save_current(&page("sam", "Sam Hill", "Acme", "2019 - 2020"))
            .await
            .unwrap();

        service.store().set_unavailable(true);
        let result = service
            .save_current(&page("sam", "Samuel Hill", "Globex", "2021 - 2022"))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Store(StoreError::Unavailable(_)))
        ));
        assert!(service
            .find_shared_history(&page("cara", "Cara", "Acme", "2019"))
            .await
            .is_err());

        service.store().set_unavailable(false);
        let profiles = service.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Sam Hill");
    }

    #[tokio::test]
    async fn test_notes_search_and_stats() {
        let service = service();
        service
            .save_current(&page("sam", "Sam Hill", "Acme", "2019 - 2020"))
            .await
            .unwrap();
        let url = "https://www.linkedin.com/in/sam/";

        let NoteChange::Saved(note) = service.add_note(url, "Intro via Cara").await.unwrap() else {
            panic!("expected a saved note");
        };
        assert_eq!(note.content, "Intro via Cara");
        assert!(service.profile(url).await.unwrap().is_some());
        assert_eq!(service.notes_for(url).await.unwrap().len(), 1);

        assert_eq!(service.search("cara").await.unwrap().len(), 1);
        let stats = service.stats().await.unwrap();
        assert_eq!((stats.profiles, stats.companies, stats.notes), (1, 1, 1));

        assert!(service.delete_profile(url).await.unwrap());
        assert_eq!(service.stats().await.unwrap().notes, 0);
    }

    #[tokio::test]
    async fn test_edit_and_clear_notes() {
        let service = service();
        let url = "https://www.linkedin.com/in/sam/";
        let NoteChange::Saved(first) = service.add_note(url, "Met at RustConf").await.unwrap() else {
            panic!("expected a saved note");
        };
        let NoteChange::Saved(second) = service.add_note(url, "Hiring in Q3").await.unwrap() else {
            panic!("expected a saved note");
        };

        let NoteChange::Saved(edited) = service
            .edit_note(url, first.id, "  Met at RustConf 2023 ")
            .await
            .unwrap()
        else {
            panic!("expected an edited note");
        };
        assert_eq!(edited.id, first.id);
        assert_eq!(edited.content, "Met at RustConf 2023");
        assert_eq!(
            service.edit_note("https://www.linkedin.com/in/other/", first.id, "x").await.unwrap(),
            NoteChange::Missing
        );

        // blank text deletes the edited note only
        assert_eq!(
            service.edit_note(url, second.id, "  ").await.unwrap(),
            NoteChange::Removed(1)
        );
        assert_eq!(service.notes_for(url).await.unwrap(), vec![edited]);

        // blank text on add clears the profile's notes
        service.add_note(url, "One more").await.unwrap();
        assert_eq!(service.add_note(url, "\n ").await.unwrap(), NoteChange::Removed(2));
        assert!(service.notes_for(url).await.unwrap().is_empty());
        assert_eq!(service.clear_notes(url).await.unwrap(), 0);
    }
}
