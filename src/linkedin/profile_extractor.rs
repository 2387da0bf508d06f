// src/linkedin/profile_extractor.rs
use super::document::ProfileDocument;
use super::experience::ExperienceExtractor;
use super::types::{EmploymentRecord, ProfileRecord};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

static PROFILE_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"linkedin\.com/in/([^/?#]+)").expect("valid regex"));
static TITLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^|(\-]+)").expect("valid regex"));

const MAX_NAME_CHARS: usize = 50;

/// Canonical `https://www.linkedin.com/in/<slug>/` form of a profile location
pub fn canonical_profile_url(location: &str) -> Option<String> {
    PROFILE_SLUG_RE
        .captures(location)
        .map(|caps| format!("https://www.linkedin.com/in/{}/", &caps[1]))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileExtractor {
    experiences: ExperienceExtractor,
}

impl ProfileExtractor {
    pub fn new() -> Self {
        Self {
            experiences: ExperienceExtractor::new(),
        }
    }

    /// Builds a profile record from the page. Missing fields stay blank.
    pub fn extract(&self, doc: &ProfileDocument, now: DateTime<Utc>) -> ProfileRecord {
        let profile_url = canonical_profile_url(doc.location()).unwrap_or_default();
        let name = Self::extract_name(doc);
        let current_title = doc.headline().unwrap_or_default();
        let work_experience = self.extract_experience(doc);

        info!(
            "Extracted profile {:?} ({}) with {} experiences",
            name,
            profile_url,
            work_experience.len()
        );

        ProfileRecord {
            name,
            profile_url,
            current_title,
            work_experience,
            extracted_at: now,
            last_updated: now,
        }
    }

    fn extract_name(doc: &ProfileDocument) -> String {
        let from_heading = doc.headings().into_iter().find(|text| {
            !text.contains("Experience")
                && !text.contains("Education")
                && text.chars().count() < MAX_NAME_CHARS
        });
        if let Some(name) = from_heading {
            return name;
        }

        doc.title()
            .and_then(|title| {
                TITLE_NAME_RE
                    .captures(title.trim_start())
                    .map(|caps| caps[1].trim().to_string())
            })
            .unwrap_or_default()
    }

    fn extract_experience(&self, doc: &ProfileDocument) -> Vec<EmploymentRecord> {
        let path = if doc.is_experience_details_page() {
            "details"
        } else {
            "main"
        };
        debug!("Reading experience from {} page", path);

        doc.experience_fragments()
            .iter()
            .flat_map(|fragment| self.experiences.extract(fragment))
            .filter(|record| !record.title.is_empty() || !record.company.is_empty())
            .collect()
    }
}
