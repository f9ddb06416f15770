// Verdict engine for twinprobe
// Decides whether a page served to the probing identity means access was granted

use crate::config::ProbeSettings;
use crate::locators::in_scope;
use crate::models::{Locator, Outcome, Page};

/// Outcome plus a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub reason: String,
}

impl Verdict {
    pub fn success(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            reason: reason.into(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Denied,
            reason: reason.into(),
        }
    }
}

/// Pluggable policy deciding Success vs Denied for a page that loaded.
///
/// Navigation faults never reach the classifier; the prober turns those into
/// Error outcomes itself.
pub trait ResponseClassifier {
    fn classify(&self, requested: &Locator, page: &Page, owner_scope: &str) -> Verdict;
}

/// Keyword and redirect heuristics, evaluated in order, first match wins:
///
/// 0. (opt-in) final status 401/403
/// 1. lower-cased body contains a denial keyword
/// 2. (on by default) final address is in the owner's scope but differs,
///    case-insensitively, from the requested one
/// 3. otherwise Success
///
/// Rule 1 misfires on legitimate pages that merely mention logging in.
/// Rule 2 misfires on benign same-origin redirects such as canonicalization.
/// Both are accepted trade-offs; rule 2 can be switched off.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
    redirect_denial: bool,
    deny_on_status: bool,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::from_settings(&ProbeSettings::default())
    }
}

impl KeywordClassifier {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            redirect_denial: true,
            deny_on_status: false,
        }
    }

    pub fn from_settings(settings: &ProbeSettings) -> Self {
        Self {
            keywords: settings
                .denial_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            redirect_denial: settings.redirect_denial,
            deny_on_status: settings.deny_on_status,
        }
    }

    pub fn with_redirect_denial(mut self, enabled: bool) -> Self {
        self.redirect_denial = enabled;
        self
    }

    pub fn with_status_denial(mut self, enabled: bool) -> Self {
        self.deny_on_status = enabled;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn matched_keyword(&self, body: &str) -> Option<&str> {
        let lowered = body.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(|k| k.as_str())
    }
}

impl ResponseClassifier for KeywordClassifier {
    fn classify(&self, requested: &Locator, page: &Page, owner_scope: &str) -> Verdict {
        if self.deny_on_status && matches!(page.status, 401 | 403) {
            return Verdict::denied(format!(
                "Access denied to {} (status {})",
                requested, page.status
            ));
        }

        if let Some(keyword) = self.matched_keyword(&page.body) {
            return Verdict::denied(format!(
                "Access denied to {} (content shows error or login page: '{}')",
                requested, keyword
            ));
        }

        if self.redirect_denial
            && in_scope(&page.final_url, owner_scope)
            && !page
                .final_url
                .as_str()
                .eq_ignore_ascii_case(requested.as_str())
        {
            return Verdict::denied(format!(
                "Access denied to {} (redirected to {})",
                requested, page.final_url
            ));
        }

        Verdict::success(format!("Content served at {} without denial signals", requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Locator {
        Locator::parse(s).unwrap()
    }

    fn page(requested: &str, final_url: &str, status: u16, body: &str) -> Page {
        Page {
            requested: loc(requested),
            final_url: loc(final_url),
            status,
            body: body.to_string(),
        }
    }

    const A: &str = "https://app.example.com/a";

    #[test]
    fn login_keyword_denies() {
        let p = page(A, A, 200, "<h1>Please Log In</h1>");
        let v = KeywordClassifier::default().classify(&loc(A), &p, "example.com");
        assert_eq!(v.outcome, Outcome::Denied);
        assert!(v.reason.contains("log in"));
    }

    #[test]
    fn forbidden_page_denies() {
        let p = page(A, A, 403, "403 Forbidden");
        let v = KeywordClassifier::default().classify(&loc(A), &p, "example.com");
        assert_eq!(v.outcome, Outcome::Denied);
    }

    #[test]
    fn keyword_rule_wins_over_redirect_rule() {
        let p = page(A, "https://app.example.com/signin", 200, "signin");
        let v = KeywordClassifier::default().classify(&loc(A), &p, "example.com");
        assert!(v.reason.contains("content shows error"));
    }

    #[test]
    fn same_scope_redirect_denies() {
        let p = page(A, "https://app.example.com/dashboard", 200, "<p>welcome</p>");
        let v = KeywordClassifier::default().classify(&loc(A), &p, "example.com");
        assert_eq!(v.outcome, Outcome::Denied);
        assert!(v.reason.contains("redirected"));
    }

    #[test]
    fn redirect_rule_can_be_disabled() {
        let p = page(A, "https://app.example.com/dashboard", 200, "<p>welcome</p>");
        let v = KeywordClassifier::default()
            .with_redirect_denial(false)
            .classify(&loc(A), &p, "example.com");
        assert_eq!(v.outcome, Outcome::Success);
    }

    #[test]
    fn off_scope_redirect_is_not_a_denial() {
        let p = page(A, "https://sso.partner.net/landing", 200, "<p>hi</p>");
        let v = KeywordClassifier::default().classify(&loc(A), &p, "example.com");
        assert_eq!(v.outcome, Outcome::Success);
    }

    #[test]
    fn unchanged_address_without_keywords_succeeds() {
        let p = page(A, A, 200, "<p>Private notes of alice</p>");
        let v = KeywordClassifier::default().classify(&loc(A), &p, "example.com");
        assert_eq!(v.outcome, Outcome::Success);
    }

    #[test]
    fn status_rule_is_opt_in() {
        let p = page(A, A, 401, "nope");
        assert_eq!(
            KeywordClassifier::default().classify(&loc(A), &p, "example.com").outcome,
            Outcome::Success
        );
        assert_eq!(
            KeywordClassifier::default()
                .with_status_denial(true)
                .classify(&loc(A), &p, "example.com")
                .outcome,
            Outcome::Denied
        );
    }

    #[test]
    fn custom_keywords_are_lowercased() {
        let classifier = KeywordClassifier::new(&["ACCESS DENIED"]);
        let p = page(A, A, 200, "Access Denied for this record");
        assert_eq!(
            classifier.classify(&loc(A), &p, "example.com").outcome,
            Outcome::Denied
        );
    }
}
