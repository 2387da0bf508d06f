// src/lib.rs
//! Save LinkedIn profiles and find people who worked at the same company
//! at the same time.

pub mod cli;
pub mod core;
pub mod linkedin;
pub mod matching;
pub mod search;
pub mod service;
pub mod store;
pub mod utils;

pub use linkedin::{ProfileDocument, ProfileRecord};
pub use matching::{MatchResult, PersonMatches};
pub use service::{MatchOutcome, NoteChange, ProfileService, ServiceError};
pub use store::{ProfileStore, StoreError};
