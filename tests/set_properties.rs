//! Property-based tests for locator set algebra.
//!
//! Diff partitions, scope filtering and extraction are pure, so their
//! contracts can be checked over arbitrary inputs.

use proptest::prelude::*;
use twinprobe::diff::diff_sets;
use twinprobe::locators::{extract, filter_to_scope, find_identifier_locators};
use twinprobe::models::{Locator, LocatorSet};

// Strategy for generating a locator on a handful of hosts and paths
fn arb_locator() -> impl Strategy<Value = Locator> {
    (
        prop_oneof![
            Just("example.com"),
            Just("app.example.com"),
            Just("cdn.other.net"),
            Just("example.com.evil.io"),
        ],
        "[a-z]{1,6}",
        prop::option::of(prop_oneof![
            Just("id=1".to_string()),
            Just("q=abc".to_string()),
            Just("flag=true".to_string()),
            "[a-z]{1,3}=[0-9]{1,3}".prop_map(|s| s),
        ]),
    )
        .prop_map(|(host, path, query)| {
            let url = match query {
                Some(q) => format!("https://{}/{}?{}", host, path, q),
                None => format!("https://{}/{}", host, path),
            };
            Locator::parse(&url).unwrap()
        })
}

fn arb_set() -> impl Strategy<Value = LocatorSet> {
    prop::collection::vec(arb_locator(), 0..20).prop_map(|v| v.into_iter().collect())
}

proptest! {
    #[test]
    fn diff_parts_are_disjoint_and_cover_union(a in arb_set(), b in arb_set()) {
        let d = diff_sets(&a, &b);
        prop_assert!(d.shared.is_disjoint(&d.unique_to_a));
        prop_assert!(d.shared.is_disjoint(&d.unique_to_b));
        prop_assert!(d.unique_to_a.is_disjoint(&d.unique_to_b));
        prop_assert_eq!(d.union(), a.union(&b));
    }

    #[test]
    fn diff_is_symmetric(a in arb_set(), b in arb_set()) {
        let ab = diff_sets(&a, &b);
        let ba = diff_sets(&b, &a);
        prop_assert_eq!(&ab.unique_to_a, &ba.unique_to_b);
        prop_assert_eq!(&ab.unique_to_b, &ba.unique_to_a);
        prop_assert_eq!(&ab.shared, &ba.shared);
    }

    #[test]
    fn scope_filter_is_subset(s in arb_set(), domain in prop_oneof![
        Just("example.com"), Just("other.net"), Just("APP.EXAMPLE.COM"), Just("")
    ]) {
        let scoped = filter_to_scope(&s, domain);
        prop_assert!(scoped.locators().is_subset(&s));
        let lowered = domain.to_ascii_lowercase();
        for l in scoped.locators() {
            prop_assert!(l.host().unwrap().ends_with(&lowered));
        }
    }

    #[test]
    fn identifier_locators_are_subset(s in arb_set()) {
        prop_assert!(find_identifier_locators(&s).is_subset(&s));
    }

    #[test]
    fn extraction_is_idempotent(s in arb_set()) {
        let markup: String = s
            .iter()
            .map(|l| format!("<a href=\"{}\">x</a>\n", l))
            .collect();
        let base = Locator::parse("https://app.example.com/home").unwrap();
        let first = extract(&markup, &base);
        prop_assert_eq!(&first, &extract(&markup, &base));
        prop_assert_eq!(first, s);
    }
}
