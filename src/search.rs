// src/search.rs
//! Text search and summary statistics over saved profiles and notes

use crate::linkedin::types::{EmploymentRecord, Note, ProfileRecord};
use crate::utils::truncate_chars;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const MIN_QUERY_CHARS: usize = 2;
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub profile: ProfileRecord,
    pub matching_experiences: Vec<EmploymentRecord>,
    pub matching_notes: Vec<Note>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub profiles: usize,
    pub companies: usize,
    pub notes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesPreview {
    pub preview: String,
    pub count: usize,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Profiles whose name, headline, experience or notes mention `query`
/// (case-insensitive). Queries shorter than two characters match nothing.
pub fn search_profiles(
    profiles: &[ProfileRecord],
    notes: &HashMap<String, Vec<Note>>,
    query: &str,
) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    profiles
        .iter()
        .filter_map(|profile| {
            let matching_experiences: Vec<EmploymentRecord> = profile
                .work_experience
                .iter()
                .filter(|exp| contains_ci(&exp.company, &query) || contains_ci(&exp.title, &query))
                .cloned()
                .collect();

            let matching_notes: Vec<Note> = notes
                .get(&profile.profile_url)
                .map(|list| {
                    list.iter()
                        .filter(|note| contains_ci(&note.content, &query))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            let hit = contains_ci(&profile.name, &query)
                || contains_ci(&profile.current_title, &query)
                || !matching_experiences.is_empty()
                || !matching_notes.is_empty();

            hit.then(|| SearchHit {
                profile: profile.clone(),
                matching_experiences,
                matching_notes,
            })
        })
        .collect()
}

pub fn stats(profiles: &[ProfileRecord], notes: &HashMap<String, Vec<Note>>) -> Stats {
    let companies: HashSet<&str> = profiles
        .iter()
        .flat_map(|p| p.work_experience.iter())
        .map(|exp| exp.company.as_str())
        .filter(|company| !company.is_empty())
        .collect();

    Stats {
        profiles: profiles.len(),
        companies: companies.len(),
        notes: notes.values().map(Vec::len).sum(),
    }
}

/// First line of the most recently updated note
pub fn notes_preview(notes: &[Note]) -> Option<NotesPreview> {
    let latest = notes.iter().max_by_key(|note| note.updated_at)?;
    let first_line = latest.content.trim().lines().next().unwrap_or_default();
    let mut preview = truncate_chars(first_line, PREVIEW_CHARS);
    if preview.chars().count() >= PREVIEW_CHARS {
        preview.push_str("...");
    }
    Some(NotesPreview {
        preview,
        count: notes.len(),
    })
}
