// Analysis pipeline for twinprobe
//
// Phases run strictly in sequence on the one browser session:
//   1. identity A: login, load origin A, extract, scope
//   2. identity B: same
//   3. diff + identifier classification (pure)
//   4. probe A's unique locators as B
//   5. probe B's unique locators as A

use crate::browser::Browser;
use crate::config::ScanConfig;
use crate::diff::{diff, DiffResult};
use crate::errors::{NavigationError, ScanError};
use crate::locators::{filter_to_scope, find_identifier_locators, scope_domain_of, LocatorExtractor};
use crate::models::{Identity, Locator, LocatorSet, Outcome, ProbeOutcome, ScopedLocatorSet};
use crate::prober::CrossSessionProber;
use crate::verdict::ResponseClassifier;
use std::time::Duration;
use tracing::{error, info};

/// What one identity can reach from its post-login page.
#[derive(Debug, Clone)]
pub struct IdentityView {
    pub label: String,
    pub origin: Locator,
    pub scoped: ScopedLocatorSet,
    /// Scoped locators flagged as likely object references.
    pub identifiers: LocatorSet,
}

/// One direction of cross-session probing.
#[derive(Debug, Clone)]
pub struct ProbeRun {
    /// Identity whose unique locators were targeted.
    pub owner: String,
    /// Identity whose session was used.
    pub prober: String,
    pub outcomes: Vec<ProbeOutcome>,
    /// Set when the prober could not log in; `outcomes` is then empty.
    pub login_error: Option<String>,
}

impl ProbeRun {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }

    pub fn bypasses(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| o.outcome == Outcome::Success)
    }
}

/// Everything a run produced, in the shape the reporter consumes.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub identity_a: IdentityView,
    pub identity_b: IdentityView,
    pub diff: DiffResult,
    /// A's unique locators probed as B.
    pub run_a_as_b: ProbeRun,
    /// B's unique locators probed as A.
    pub run_b_as_a: ProbeRun,
}

impl AnalysisReport {
    pub fn total_bypasses(&self) -> usize {
        self.run_a_as_b.count(Outcome::Success) + self.run_b_as_a.count(Outcome::Success)
    }
}

/// Owns the session and the strategies for one analysis run.
pub struct Pipeline<B: Browser, E: LocatorExtractor, C: ResponseClassifier> {
    browser: B,
    extractor: E,
    classifier: C,
    timeout: Duration,
}

impl<B: Browser, E: LocatorExtractor, C: ResponseClassifier> Pipeline<B, E, C> {
    pub fn new(browser: B, extractor: E, classifier: C, timeout: Duration) -> Self {
        Self {
            browser,
            extractor,
            classifier,
            timeout,
        }
    }

    pub fn into_browser(self) -> B {
        self.browser
    }

    pub async fn run(&mut self, config: &ScanConfig) -> Result<AnalysisReport, ScanError> {
        config.validate()?;

        let identity_a = self.discover(&config.identity_a, &config.origin_a).await?;
        let identity_b = self.discover(&config.identity_b, &config.origin_b).await?;

        let diff = diff(&identity_a.scoped, &identity_b.scoped);
        info!(
            shared = diff.shared.len(),
            unique_a = diff.unique_to_a.len(),
            unique_b = diff.unique_to_b.len(),
            "diffed reachable locators"
        );

        let run_a_as_b = self
            .probe_run(&diff.unique_to_a, &config.identity_a, &config.identity_b, identity_a.scoped.scope_domain())
            .await;
        let run_b_as_a = self
            .probe_run(&diff.unique_to_b, &config.identity_b, &config.identity_a, identity_b.scoped.scope_domain())
            .await;

        Ok(AnalysisReport {
            identity_a,
            identity_b,
            diff,
            run_a_as_b,
            run_b_as_a,
        })
    }

    /// Login, load the post-login page and reduce it to a scoped locator set.
    async fn discover(&mut self, identity: &Identity, origin: &str) -> Result<IdentityView, ScanError> {
        let origin = Locator::parse(origin).map_err(|_| NavigationError::InvalidUrl(origin.to_string()))?;
        let login_url = Locator::parse(&identity.login_url)
            .map_err(|_| NavigationError::InvalidUrl(identity.login_url.clone()))?;

        self.browser
            .login(identity, &login_url)
            .await
            .map_err(|source| ScanError::Login {
                identity: identity.label.clone(),
                source,
            })?;

        let page = match tokio::time::timeout(self.timeout, self.browser.navigate(&origin)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(NavigationError::Timeout {
                    url: origin.to_string(),
                    duration: self.timeout,
                }
                .into())
            }
        };

        // Locators resolve against where the page actually landed.
        let source = self.browser.page_source().to_string();
        let all = self.extractor.extract(&source, &page.final_url);

        let scope_domain = scope_domain_of(&origin)
            .ok_or_else(|| NavigationError::InvalidUrl(origin.to_string()))?;
        let scoped = filter_to_scope(&all, &scope_domain);
        let identifiers = find_identifier_locators(scoped.locators());

        info!(
            identity = %identity.label,
            extracted = all.len(),
            in_scope = scoped.len(),
            identifiers = identifiers.len(),
            "collected reachable locators"
        );

        Ok(IdentityView {
            label: identity.label.clone(),
            origin,
            scoped,
            identifiers,
        })
    }

    async fn probe_run(
        &mut self,
        targets: &LocatorSet,
        owner: &Identity,
        prober: &Identity,
        owner_scope: &str,
    ) -> ProbeRun {
        info!(
            owner = %owner.label,
            prober = %prober.label,
            targets = targets.len(),
            "probing unique locators"
        );

        let mut probe = CrossSessionProber::new(&mut self.browser, &self.classifier, self.timeout);
        let (outcomes, login_error) = match probe.probe(targets, prober, owner_scope).await {
            Ok(outcomes) => (outcomes, None),
            Err(e) => {
                error!(prober = %prober.label, error = %e, "login failed, probe run aborted");
                (Vec::new(), Some(e.to_string()))
            }
        };

        ProbeRun {
            owner: owner.label.clone(),
            prober: prober.label.clone(),
            outcomes,
            login_error,
        }
    }
}
