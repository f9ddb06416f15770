// Core data models for twinprobe
// Locators, locator sets, identities and probe outcomes

use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// An absolute resource address.
///
/// Parsing through `url::Url` is the normalization step: scheme and host are
/// lower-cased, default ports are dropped and a bare host gets a `/` path.
/// Ordering follows the serialized form, so sorted enumeration is lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Locator(Url);

impl Locator {
    /// Parse an absolute address. Relative references are rejected.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Locator)
    }

    /// Resolve a raw reference against this locator as base.
    pub fn join(&self, reference: &str) -> Result<Self, url::ParseError> {
        self.0.join(reference).map(Locator)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Lower-cased host, if the locator has one (`mailto:` and friends don't).
    pub fn host(&self) -> Option<String> {
        self.0.host_str().map(|h| h.to_ascii_lowercase())
    }

    pub fn query(&self) -> Option<&str> {
        self.0.query()
    }
}

impl From<Url> for Locator {
    fn from(url: Url) -> Self {
        Locator(url)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// A duplicate-free set of locators with sorted enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorSet {
    members: BTreeSet<Locator>,
}

impl LocatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the locator was already present.
    pub fn insert(&mut self, locator: Locator) -> bool {
        self.members.insert(locator)
    }

    pub fn contains(&self, locator: &Locator) -> bool {
        self.members.contains(locator)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Locator> {
        self.members.iter()
    }

    pub fn intersection(&self, other: &LocatorSet) -> LocatorSet {
        self.members.intersection(&other.members).cloned().collect()
    }

    pub fn difference(&self, other: &LocatorSet) -> LocatorSet {
        self.members.difference(&other.members).cloned().collect()
    }

    pub fn union(&self, other: &LocatorSet) -> LocatorSet {
        self.members.union(&other.members).cloned().collect()
    }

    pub fn is_subset(&self, other: &LocatorSet) -> bool {
        self.members.is_subset(&other.members)
    }

    pub fn is_disjoint(&self, other: &LocatorSet) -> bool {
        self.members.is_disjoint(&other.members)
    }

    /// Members as strings, in enumeration order.
    pub fn to_strings(&self) -> Vec<String> {
        self.members.iter().map(|l| l.to_string()).collect()
    }
}

impl FromIterator<Locator> for LocatorSet {
    fn from_iter<I: IntoIterator<Item = Locator>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LocatorSet {
    type Item = Locator;
    type IntoIter = btree_set::IntoIter<Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a LocatorSet {
    type Item = &'a Locator;
    type IntoIter = btree_set::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// A locator set restricted to one scope domain.
///
/// Only `locators::filter_to_scope` builds these, which keeps the invariant
/// that every member's host ends with `scope_domain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedLocatorSet {
    scope_domain: String,
    locators: LocatorSet,
}

impl ScopedLocatorSet {
    pub(crate) fn new(scope_domain: String, locators: LocatorSet) -> Self {
        Self {
            scope_domain,
            locators,
        }
    }

    pub fn scope_domain(&self) -> &str {
        &self.scope_domain
    }

    pub fn locators(&self) -> &LocatorSet {
        &self.locators
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    pub fn into_locators(self) -> LocatorSet {
        self.locators
    }
}

/// One login form field, addressed by its `name` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialField {
    pub field: String,
    pub value: String,
}

impl CredentialField {
    pub fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

fn default_submit_id() -> String {
    "login".to_string()
}

/// A logical actor that can establish a session through a login form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Human-readable label used in reports.
    pub label: String,
    pub login_url: String,
    pub credentials: Vec<CredentialField>,
    /// `id` of the submit control clicked to log in.
    #[serde(default = "default_submit_id")]
    pub submit_id: String,
}

impl Identity {
    pub fn new(label: &str, login_url: &str, credentials: Vec<CredentialField>) -> Self {
        Self {
            label: label.to_string(),
            login_url: login_url.to_string(),
            credentials,
            submit_id: default_submit_id(),
        }
    }
}

// Credential values stay out of Debug output so they never reach the logs.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.credentials.iter().map(|c| c.field.as_str()).collect();
        f.debug_struct("Identity")
            .field("label", &self.label)
            .field("login_url", &self.login_url)
            .field("credential_fields", &fields)
            .field("submit_id", &self.submit_id)
            .finish()
    }
}

/// A rendered page as returned by navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub requested: Locator,
    /// Address after following redirects.
    pub final_url: Locator,
    pub status: u16,
    pub body: String,
}

/// Classification of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Denied,
    Error,
}

impl Outcome {
    /// Headline shown in reports.
    pub fn headline(&self) -> &'static str {
        match self {
            Outcome::Success => "Authorization Bypass Successful",
            Outcome::Denied => "Authorization Bypass Failed",
            Outcome::Error => "Probe Error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "SUCCESS"),
            Outcome::Denied => write!(f, "DENIED"),
            Outcome::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of probing one locator as one identity. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub locator: Locator,
    /// Label of the identity the probe ran as.
    pub prober: String,
    pub outcome: Outcome,
    pub reason: String,
    /// Final address after redirects; `None` when navigation failed.
    pub observed_url: Option<Locator>,
}
