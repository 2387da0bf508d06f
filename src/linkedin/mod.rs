// src/linkedin/mod.rs
//! Profile extraction from rendered LinkedIn pages

pub mod document;
pub mod experience;
pub mod profile_extractor;
pub mod types;

pub use document::ProfileDocument;
pub use experience::{ExperienceExtractor, Fragment};
pub use profile_extractor::{canonical_profile_url, ProfileExtractor};
pub use types::{EmploymentRecord, Note, ProfileRecord};
