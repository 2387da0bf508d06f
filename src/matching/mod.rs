// src/matching/mod.rs
//! Company-name normalization, duration parsing and overlap search

pub mod company;
pub mod duration;
pub mod overlap;

pub use company::{normalize_company_name, same_company};
pub use duration::{DurationParser, Interval};
pub use overlap::{group_by_person, MatchResult, OverlapMatcher, OverlapWindow, PersonMatches};
