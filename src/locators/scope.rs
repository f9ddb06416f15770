// Scope Filtering
//
// Keeps the locators whose host ends with the scope domain. Suffix match, so
// subdomains of the target are in scope; callers wanting a single host pass
// the full host. Hosts are compared lower-cased. Locators without a host
// (mailto:, javascript:, data:) are never in scope.

use crate::models::{Locator, LocatorSet, ScopedLocatorSet};
use tracing::debug;

/// Restrict `set` to locators under `scope_domain`.
pub fn filter_to_scope(set: &LocatorSet, scope_domain: &str) -> ScopedLocatorSet {
    let domain = normalize_domain(scope_domain);
    let kept: LocatorSet = set
        .iter()
        .filter(|l| in_scope(l, &domain))
        .cloned()
        .collect();

    debug!(
        scope = %domain,
        kept = kept.len(),
        dropped = set.len() - kept.len(),
        "filtered locators to scope"
    );
    ScopedLocatorSet::new(domain, kept)
}

/// Whether the locator's host ends with the scope domain.
pub fn in_scope(locator: &Locator, scope_domain: &str) -> bool {
    let domain = normalize_domain(scope_domain);
    if domain.is_empty() {
        return false;
    }
    locator
        .host()
        .map_or(false, |host| host.ends_with(&domain))
}

/// Scope domain of a post-login page: its lower-cased host.
pub fn scope_domain_of(origin: &Locator) -> Option<String> {
    origin.host()
}

fn normalize_domain(scope_domain: &str) -> String {
    scope_domain.trim().to_ascii_lowercase()
}
