// src/matching/company.rs
use regex::Regex;
use std::sync::LazyLock;

// Matched anywhere in the name, not only as a trailing word.
static LEGAL_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",?\s*(llc|inc|ltd|gmbh)\.?").expect("valid regex"));

/// Canonical form of an organization name, used only for equality checks
pub fn normalize_company_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    LEGAL_SUFFIX_RE
        .replace_all(&lowered, "")
        .trim()
        .to_string()
}

/// Two names refer to the same organization when their normalized forms are equal.
/// Blank names never match anything.
pub fn same_company(a: &str, b: &str) -> bool {
    let a = normalize_company_name(a);
    !a.is_empty() && a == normalize_company_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_company_name() {
        assert_eq!(normalize_company_name("Acme, Inc."), "acme");
        assert_eq!(normalize_company_name("acme inc"), "acme");
        assert_eq!(normalize_company_name("ACME, LLC"), "acme");
        assert_eq!(normalize_company_name("Globex Ltd."), "globex");
        assert_eq!(normalize_company_name("Initech GmbH"), "initech");
        assert_eq!(normalize_company_name("  Umbrella  "), "umbrella");
    }

    #[test]
    fn test_suffix_variants_compare_equal() {
        assert_eq!(
            normalize_company_name("Acme, Inc."),
            normalize_company_name("acme inc")
        );
        assert!(same_company("Acme Inc.", "ACME, LLC"));
        assert!(!same_company("Acme", "Globex"));
    }

    #[test]
    fn test_suffix_removed_inside_words() {
        assert_eq!(normalize_company_name("Incline Partners"), "line partners");
    }

    #[test]
    fn test_blank_names_never_match() {
        assert!(!same_company("", ""));
        assert!(!same_company("   ", "   "));
        assert!(!same_company("Inc.", "LLC"));
    }
}
