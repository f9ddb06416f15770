// Locator Extraction
//
// Scans page markup for href / src / action attribute values and resolves them
// against the page address. Regex over text, not a DOM parse: unterminated
// tags and inline scripts are tolerated, anything that does not match or does
// not resolve is skipped. Extraction never fails.
//
// Example:
//   Input:  <a href="/profile?id=5">  base: https://app.example.com/home
//   Output: {https://app.example.com/profile?id=5}

use crate::models::{Locator, LocatorSet};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    // Attribute names are case-insensitive; the value runs to the first quote
    // of either kind, matching how the attribute scan has always behaved.
    static ref ATTRIBUTE_PATTERN: Regex =
        Regex::new(r#"(?i)(?:href|src|action)=["'](.*?)["']"#).unwrap();
}

/// Produces the locator set referenced by a page.
pub trait LocatorExtractor {
    fn extract(&self, markup: &str, base: &Locator) -> LocatorSet;
}

/// Attribute scan using a regular expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl LocatorExtractor for RegexExtractor {
    fn extract(&self, markup: &str, base: &Locator) -> LocatorSet {
        let mut locators = LocatorSet::new();
        let mut skipped = 0usize;

        for cap in ATTRIBUTE_PATTERN.captures_iter(markup) {
            let Some(raw) = cap.get(1) else { continue };
            match resolve_reference(base, raw.as_str()) {
                Some(locator) => {
                    locators.insert(locator);
                }
                None => skipped += 1,
            }
        }

        debug!(
            base = %base,
            found = locators.len(),
            skipped,
            "extracted locators"
        );
        locators
    }
}

/// Convenience wrapper around [`RegexExtractor`].
pub fn extract(markup: &str, base: &Locator) -> LocatorSet {
    RegexExtractor.extract(markup, base)
}

/// Standard relative reference resolution. Absolute references are used as-is,
/// protocol-relative ones inherit the scheme, path-relative ones inherit
/// scheme and host.
fn resolve_reference(base: &Locator, raw: &str) -> Option<Locator> {
    let raw = raw.trim();
    base.join(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Locator {
        Locator::parse("https://app.example.com/home").unwrap()
    }

    #[test]
    fn resolves_path_relative_href() {
        let set = extract(r#"<a href="/profile?id=5">me</a>"#, &base());
        assert_eq!(set.to_strings(), vec!["https://app.example.com/profile?id=5"]);
    }

    #[test]
    fn resolves_protocol_relative_and_keeps_absolute() {
        let markup = r#"
            <script src="//cdn.example.net/app.js"></script>
            <a href='https://other.org/x'>x</a>
        "#;
        let set = extract(markup, &base());
        assert!(set.contains(&Locator::parse("https://cdn.example.net/app.js").unwrap()));
        assert!(set.contains(&Locator::parse("https://other.org/x").unwrap()));
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        let markup = r#"<FORM ACTION="/submit"><IMG SRC='logo.png'></FORM>"#;
        let set = extract(markup, &base());
        assert_eq!(
            set.to_strings(),
            vec![
                "https://app.example.com/logo.png",
                "https://app.example.com/submit"
            ]
        );
    }

    #[test]
    fn duplicates_collapse() {
        let markup = r#"<a href="/a"></a><a href="/a"></a><a href="https://app.example.com/a"></a>"#;
        assert_eq!(extract(markup, &base()).len(), 1);
    }

    #[test]
    fn malformed_markup_is_tolerated() {
        let markup = r#"<div><a href="/ok">ok<a href="/unterminated <script>var s = "x";</script"#;
        let set = extract(markup, &base());
        assert!(set.contains(&Locator::parse("https://app.example.com/ok").unwrap()));
    }

    #[test]
    fn unresolvable_reference_is_skipped() {
        // "http://" with an empty host cannot be parsed
        let set = extract(r#"<a href="http://">x</a><a href="/fine">y</a>"#, &base());
        assert_eq!(set.to_strings(), vec!["https://app.example.com/fine"]);
    }

    #[test]
    fn empty_markup_yields_empty_set() {
        assert!(extract("", &base()).is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let markup = r#"<a href="/a?id=1"></a><link href="style.css"><form action="/f">"#;
        assert_eq!(extract(markup, &base()), extract(markup, &base()));
    }
}
