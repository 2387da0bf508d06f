// src/linkedin/experience.rs
//! Turns one experience fragment into employment records.
//!
//! A fragment is either a single position (flat) or a company header with
//! nested positions (grouped). Flat fragments carry no labels, so each text
//! line is classified by shape and the first line of each kind wins.

use super::types::EmploymentRecord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const MIDDLE_DOT: char = '·';

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{4}").expect("valid regex")
});
static DATE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec|Present|\d{4})")
        .expect("valid regex")
});

/// Visually grouped block of profile text, independent of how it was read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Bold header line: the title of a position, or the company of a group
    pub header: Option<String>,
    /// Caption line holding the date range of a nested position
    pub caption: Option<String>,
    /// Short visible text lines, in document order
    pub spans: Vec<String>,
    /// Free-text "show more" block
    pub description: Option<String>,
    /// Nested positions when the fragment groups several roles at one company
    pub sub_positions: Option<Vec<Fragment>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Duration,
    Location,
    CompanyDetail,
    Plain,
}

/// Two month/year tokens joined by a dash, e.g. "Jan 2019 - Dec 2020"
pub fn is_date_range(text: &str) -> bool {
    MONTH_YEAR_RE.is_match(text) && text.contains('-')
}

/// Any month name, "Present" or a four digit year
pub fn has_date_token(text: &str) -> bool {
    DATE_TOKEN_RE.is_match(text)
}

pub fn classify_line(text: &str) -> LineKind {
    if is_date_range(text) {
        LineKind::Duration
    } else if text.contains(',') && !text.contains(MIDDLE_DOT) {
        LineKind::Location
    } else if text.contains(MIDDLE_DOT) {
        LineKind::CompanyDetail
    } else {
        LineKind::Plain
    }
}

fn before_middle_dot(text: &str) -> String {
    text.split(MIDDLE_DOT).next().unwrap_or_default().trim().to_string()
}

/// Assigns fields from the lines of an ungrouped fragment
pub fn classify_flat(lines: &[String]) -> EmploymentRecord {
    let mut record = EmploymentRecord::default();
    let mut title_found = false;
    let mut company_found = false;

    for text in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        match classify_line(text) {
            LineKind::Duration => {
                if record.duration.is_empty() {
                    record.duration = text.to_string();
                }
            }
            LineKind::Location => {
                if record.location.is_empty() {
                    record.location = text.to_string();
                }
            }
            LineKind::CompanyDetail => {
                if !company_found {
                    record.company = before_middle_dot(text);
                    company_found = true;
                }
            }
            LineKind::Plain => {
                if !title_found {
                    record.title = text.to_string();
                    title_found = true;
                } else if !company_found {
                    record.company = text.to_string();
                    company_found = true;
                }
            }
        }
    }

    repair_swapped_columns(&mut record);
    record
}

/// When the title line is missing the company and duration columns shift;
/// put them back.
pub fn repair_swapped_columns(record: &mut EmploymentRecord) {
    if is_date_range(&record.company)
        && !record.duration.is_empty()
        && !is_date_range(&record.duration)
    {
        debug!(
            "Repairing swapped company/duration: {:?} / {:?}",
            record.company, record.duration
        );
        let duration = std::mem::take(&mut record.company);
        record.company = before_middle_dot(&record.duration);
        record.duration = duration;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExperienceExtractor;

impl ExperienceExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, fragment: &Fragment) -> Vec<EmploymentRecord> {
        match &fragment.sub_positions {
            Some(positions) => {
                let company = trimmed(fragment.header.as_deref());
                positions
                    .iter()
                    .map(|position| Self::grouped_position(&company, position))
                    .filter(|record| !record.title.is_empty() || !record.duration.is_empty())
                    .collect()
            }
            None => {
                let mut record = classify_flat(&fragment.spans);
                record.description = trimmed(fragment.description.as_deref());
                if record.title.is_empty() && record.company.is_empty() {
                    Vec::new()
                } else {
                    vec![record]
                }
            }
        }
    }

    fn grouped_position(company: &str, position: &Fragment) -> EmploymentRecord {
        let caption = trimmed(position.caption.as_deref());
        let duration = if has_date_token(&caption) {
            caption
        } else {
            String::new()
        };

        let location = position
            .spans
            .iter()
            .map(|span| span.trim())
            .find(|text| {
                text.contains(',')
                    && !text.contains(MIDDLE_DOT)
                    && text.chars().count() > 5
                    && !has_date_token(text)
            })
            .unwrap_or_default()
            .to_string();

        EmploymentRecord {
            company: company.to_string(),
            title: trimmed(position.header.as_deref()),
            duration,
            location,
            description: trimmed(position.description.as_deref()),
        }
    }
}

fn trimmed(text: Option<&str>) -> String {
    text.map(str::trim).unwrap_or_default().to_string()
}
