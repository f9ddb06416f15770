// Identifier Classification
//
// Flags locators whose query string assigns a bare integer or a boolean
// literal, the usual shape of a direct object reference (?id=42, ?admin=true).
//
// Heuristic only. Known false positives: benign numeric flags such as
// ?page=2. Known false negatives: opaque identifiers (UUIDs, hashes, base64)
// and identifiers carried in the path. Both are accepted, not corrected here.
//
// Example:
//   https://app.example.com/item?id=42        -> flagged (Numeric)
//   https://app.example.com/flag?enabled=True -> flagged (Boolean)
//   https://app.example.com/search?q=hello    -> not flagged

use crate::models::{Locator, LocatorSet};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER_VALUE: Regex = Regex::new(r"(?i)=[0-9]+|=true|=false").unwrap();
    static ref BOOLEAN_VALUE: Regex = Regex::new(r"(?i)=(true|false)").unwrap();
}

/// Shape of a flagged parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Numeric,
    Boolean,
}

/// A query parameter that made a locator look like an object reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierParam {
    pub name: String,
    pub value: String,
    pub kind: IdentifierKind,
}

/// Whether the locator's query carries an identifier-looking assignment.
pub fn is_identifier_locator(locator: &Locator) -> bool {
    locator
        .query()
        .map_or(false, |q| IDENTIFIER_VALUE.is_match(q))
}

/// Subset of `set` flagged as likely direct object references.
pub fn find_identifier_locators(set: &LocatorSet) -> LocatorSet {
    set.iter()
        .filter(|l| is_identifier_locator(l))
        .cloned()
        .collect()
}

/// The individual query parameters responsible for flagging a locator.
pub fn identifier_params(locator: &Locator) -> Vec<IdentifierParam> {
    let Some(query) = locator.query() else {
        return Vec::new();
    };

    query
        .split('&')
        .filter_map(|segment| {
            if !IDENTIFIER_VALUE.is_match(segment) {
                return None;
            }
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            let kind = if BOOLEAN_VALUE.is_match(segment) && !value.chars().any(|c| c.is_ascii_digit()) {
                IdentifierKind::Boolean
            } else {
                IdentifierKind::Numeric
            };
            Some(IdentifierParam {
                name: name.to_string(),
                value: value.to_string(),
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Locator {
        Locator::parse(s).unwrap()
    }

    #[test]
    fn flags_numeric_id() {
        assert!(is_identifier_locator(&loc("https://app.example.com/item?id=42")));
    }

    #[test]
    fn flags_boolean_any_case() {
        assert!(is_identifier_locator(&loc("https://app.example.com/flag?enabled=True")));
        assert!(is_identifier_locator(&loc("https://app.example.com/flag?enabled=FALSE")));
    }

    #[test]
    fn ignores_plain_text_values() {
        assert!(!is_identifier_locator(&loc("https://app.example.com/search?q=hello")));
    }

    #[test]
    fn ignores_path_identifiers() {
        // identifiers outside the query are a documented false negative
        assert!(!is_identifier_locator(&loc("https://app.example.com/users/42")));
    }

    #[test]
    fn ignores_uuid_values() {
        assert!(!is_identifier_locator(&loc(
            "https://app.example.com/doc?ref=c0ffee00-aaaa-bbbb-cccc-0123456789ab"
        )));
    }

    #[test]
    fn subset_of_input() {
        let set: LocatorSet = vec![
            loc("https://app.example.com/item?id=42"),
            loc("https://app.example.com/search?q=hello"),
            loc("https://app.example.com/flag?enabled=True"),
        ]
        .into_iter()
        .collect();
        let flagged = find_identifier_locators(&set);
        assert_eq!(flagged.len(), 2);
        assert!(flagged.is_subset(&set));
    }

    #[test]
    fn reports_responsible_params() {
        let params = identifier_params(&loc(
            "https://app.example.com/order?q=abc&order_id=77&archived=false",
        ));
        assert_eq!(
            params,
            vec![
                IdentifierParam {
                    name: "order_id".to_string(),
                    value: "77".to_string(),
                    kind: IdentifierKind::Numeric,
                },
                IdentifierParam {
                    name: "archived".to_string(),
                    value: "false".to_string(),
                    kind: IdentifierKind::Boolean,
                },
            ]
        );
    }
}
