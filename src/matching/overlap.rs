// src/matching/overlap.rs
//! Finds saved people who worked at the same organization as the current
//! profile during an overlapping period.
//!
//! Every saved experience is compared with every current experience. Profile
//! and experience counts are expected to stay in the tens; an index from
//! normalized company name to experiences would be needed beyond that.

use super::company::normalize_company_name;
use super::duration::DurationParser;
use crate::linkedin::types::ProfileRecord;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Intersection of two employment intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl OverlapWindow {
    /// "Jun 2020 – Dec 2020", with the end shown as "Present" when it falls in the current month
    pub fn display(&self, now: NaiveDateTime) -> String {
        let end = if self.end.year() == now.year() && self.end.month() == now.month() {
            "Present".to_string()
        } else {
            month_year(self.end)
        };
        format!("{} – {}", month_year(self.start), end)
    }
}

fn month_year(at: NaiveDateTime) -> String {
    format!("{} {}", MONTH_NAMES[at.month0() as usize], at.year())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub name: String,
    pub profile_url: String,
    /// Company as written on the saved profile
    pub company: String,
    pub overlap: OverlapWindow,
    pub saved_title: String,
    pub current_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonMatches {
    pub name: String,
    pub profile_url: String,
    pub experiences: Vec<MatchResult>,
}

#[derive(Clone, Default)]
pub struct OverlapMatcher {
    durations: DurationParser,
}

impl OverlapMatcher {
    pub fn new(durations: DurationParser) -> Self {
        Self { durations }
    }

    pub fn find_overlaps(
        &self,
        current: &ProfileRecord,
        saved: &[ProfileRecord],
    ) -> Vec<MatchResult> {
        let mut matches = Vec::new();

        for saved_profile in saved {
            if saved_profile.profile_url.is_empty()
                || saved_profile.profile_url == current.profile_url
            {
                continue;
            }
            debug!("Comparing with saved profile: {}", saved_profile.name);

            for saved_exp in &saved_profile.work_experience {
                for current_exp in &current.work_experience {
                    let saved_company = normalize_company_name(&saved_exp.company);
                    if saved_company.is_empty()
                        || saved_company != normalize_company_name(&current_exp.company)
                    {
                        continue;
                    }
                    debug!("Company match: {:?}", saved_exp.company);

                    let saved_interval = self.durations.parse(&saved_exp.duration);
                    let current_interval = self.durations.parse(&current_exp.duration);
                    let (Some((saved_start, saved_end)), Some((current_start, current_end))) =
                        (saved_interval.resolved(), current_interval.resolved())
                    else {
                        debug!(
                            "Skipping unresolved durations {:?} / {:?}",
                            saved_exp.duration, current_exp.duration
                        );
                        continue;
                    };

                    if saved_start <= current_end && current_start <= saved_end {
                        matches.push(MatchResult {
                            name: saved_profile.name.clone(),
                            profile_url: saved_profile.profile_url.clone(),
                            company: saved_exp.company.clone(),
                            overlap: OverlapWindow {
                                start: saved_start.max(current_start),
                                end: saved_end.min(current_end),
                            },
                            saved_title: saved_exp.title.clone(),
                            current_title: current_exp.title.clone(),
                        });
                    }
                }
            }
        }

        matches
    }
}

/// Groups matches per person, in order of each person's first match
pub fn group_by_person(matches: Vec<MatchResult>) -> Vec<PersonMatches> {
    let mut people: Vec<PersonMatches> = Vec::new();
    for found in matches {
        match people
            .iter_mut()
            .find(|person| person.profile_url == found.profile_url)
        {
            Some(person) => person.experiences.push(found),
            None => people.push(PersonMatches {
                name: found.name.clone(),
                profile_url: found.profile_url.clone(),
                experiences: vec![found],
            }),
        }
    }
    people
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::linkedin::types::EmploymentRecord;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::Arc;

    fn matcher() -> OverlapMatcher {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        OverlapMatcher::new(DurationParser::new(Arc::new(FixedClock(now))))
    }

    fn exp(company: &str, title: &str, duration: &str) -> EmploymentRecord {
        EmploymentRecord {
            company: company.to_string(),
            title: title.to_string(),
            duration: duration.to_string(),
            ..Default::default()
        }
    }

    fn profile(name: &str, slug: &str, experience: Vec<EmploymentRecord>) -> ProfileRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ProfileRecord {
            name: name.to_string(),
            profile_url: format!("https://www.linkedin.com/in/{}/", slug),
            current_title: String::new(),
            work_experience: experience,
            extracted_at: at,
            last_updated: at,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_overlap_across_suffix_variants() {
        let saved = profile("Sam", "sam", vec![exp("Acme Inc.", "Engineer", "Jan 2019 - Dec 2020")]);
        let current = profile("Cara", "cara", vec![exp("ACME, LLC", "Designer", "Jun 2020 - Present")]);

        let matches = matcher().find_overlaps(&current, &[saved]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Sam");
        assert_eq!(matches[0].company, "Acme Inc.");
        assert_eq!(matches[0].saved_title, "Engineer");
        assert_eq!(matches[0].current_title, "Designer");
        assert_eq!(
            matches[0].overlap,
            OverlapWindow {
                start: day(2020, 6, 1),
                end: day(2020, 12, 31)
            }
        );
    }

    #[test]
    fn test_adjacent_years_do_not_overlap() {
        let saved = profile("Sam", "sam", vec![exp("Acme", "Engineer", "2015")]);
        let current = profile("Cara", "cara", vec![exp("Acme", "Engineer", "2016")]);
        assert!(matcher().find_overlaps(&current, &[saved]).is_empty());
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        let saved = profile("Sam", "sam", vec![exp("Acme", "A", "Jan 2019 - Mar 2019")]);
        let current = profile("Cara", "cara", vec![exp("Acme", "B", "Mar 2019 - Jun 2019")]);
        let matches = matcher().find_overlaps(&current, &[saved]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].overlap.start, day(2019, 3, 1));
        assert_eq!(matches[0].overlap.end, day(2019, 3, 31));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = profile(
            "Ann",
            "ann",
            vec![
                exp("Acme Inc.", "Engineer", "Jan 2019 - Dec 2020"),
                exp("Globex", "Lead", "2012 - 2016"),
            ],
        );
        let b = profile(
            "Bob",
            "bob",
            vec![
                exp("acme", "Analyst", "Mar 2020 - Present"),
                exp("Globex Ltd", "Dev", "Jul 2015 - Feb 2017"),
            ],
        );

        let m = matcher();
        let windows = |found: Vec<MatchResult>| {
            let mut w: Vec<_> = found.into_iter().map(|r| r.overlap).collect();
            w.sort_by_key(|o| (o.start, o.end));
            w
        };
        let ab = windows(m.find_overlaps(&a, std::slice::from_ref(&b)));
        let ba = windows(m.find_overlaps(&b, std::slice::from_ref(&a)));
        assert_eq!(ab.len(), 2);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_self_match_is_excluded() {
        let current = profile("Ann", "ann", vec![exp("Acme", "Engineer", "Jan 2019 - Dec 2020")]);
        let saved_copy = current.clone();
        assert!(matcher().find_overlaps(&current, &[saved_copy]).is_empty());
    }

    #[test]
    fn test_blank_url_and_blank_company_are_skipped() {
        let mut no_url = profile("Ghost", "ghost", vec![exp("Acme", "X", "2019 - 2020")]);
        no_url.profile_url.clear();
        let blank_company = profile("Blank", "blank", vec![exp("", "X", "2019 - 2020")]);
        let current = profile("Ann", "ann", vec![exp("Acme", "Y", "2019 - 2020"), exp("", "Z", "2019 - 2020")]);

        assert!(matcher().find_overlaps(&current, &[no_url, blank_company]).is_empty());
    }

    #[test]
    fn test_unresolved_duration_never_matches() {
        let saved = profile("Sam", "sam", vec![exp("Acme", "Engineer", "")]);
        let current = profile("Cara", "cara", vec![exp("Acme", "Engineer", "Jun 2020 - Present")]);
        assert!(matcher().find_overlaps(&current, &[saved]).is_empty());
    }

    #[test]
    fn test_grouping_keeps_one_entry_per_person() {
        let sam = profile(
            "Sam",
            "sam",
            vec![
                exp("Acme", "Engineer", "Jan 2019 - Dec 2020"),
                exp("Globex", "Intern", "Jun 2015 - Aug 2015"),
            ],
        );
        let lee = profile("Lee", "lee", vec![exp("Acme", "PM", "2020")]);
        let current = profile(
            "Cara",
            "cara",
            vec![
                exp("Acme", "Designer", "Jun 2020 - Present"),
                exp("Globex", "Intern", "Jul 2015 - Sep 2015"),
            ],
        );

        let matches = matcher().find_overlaps(&current, &[sam, lee]);
        assert_eq!(matches.len(), 3);

        let people = group_by_person(matches);
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "Sam");
        assert_eq!(people[0].experiences.len(), 2);
        assert_eq!(people[1].name, "Lee");
        assert_eq!(people[1].experiences.len(), 1);
    }

    #[test]
    fn test_inverted_and_future_ranges_still_compare() {
        let inverted = profile("Sam", "sam", vec![exp("Acme", "Engineer", "Jan 2021 - Jan 2019")]);
        let current = profile("Cara", "cara", vec![exp("Acme", "Designer", "2018 - 2022")]);
        let matches = matcher().find_overlaps(&current, &[inverted]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].overlap.start, day(2021, 1, 1));
        assert_eq!(matches[0].overlap.end, day(2019, 1, 31));

        let future = profile("Lee", "lee", vec![exp("Acme", "PM", "Jan 2030 - Present")]);
        let current = profile("Cara", "cara", vec![exp("Acme", "Designer", "2020 - 2035")]);
        assert_eq!(matcher().find_overlaps(&current, &[future]).len(), 1);
    }

    #[test]
    fn test_window_display() {
        let now = day(2024, 6, 15);
        let past = OverlapWindow {
            start: day(2020, 6, 1),
            end: day(2020, 12, 31),
        };
        assert_eq!(past.display(now), "Jun 2020 – Dec 2020");

        let ongoing = OverlapWindow {
            start: day(2022, 1, 1),
            end: now,
        };
        assert_eq!(ongoing.display(now), "Jan 2022 – Present");
    }
}
