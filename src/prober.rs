// Cross-session prober for twinprobe
// Replays one identity's unique locators under another identity's session

use crate::browser::Browser;
use crate::errors::{LoginError, NavigationError};
use crate::models::{Identity, Locator, LocatorSet, Outcome, Page, ProbeOutcome};
use crate::verdict::ResponseClassifier;
use std::time::Duration;
use tracing::{error, info, warn};

/// Drives one browser session through a probe run.
///
/// Locators are probed one at a time in the set's sorted order. A navigation
/// fault or timeout on one locator becomes an Error outcome for it and the run
/// continues; only a failed login ends the run.
pub struct CrossSessionProber<'a, B: Browser, C: ResponseClassifier> {
    browser: &'a mut B,
    classifier: &'a C,
    timeout: Duration,
}

impl<'a, B: Browser, C: ResponseClassifier> CrossSessionProber<'a, B, C> {
    pub fn new(browser: &'a mut B, classifier: &'a C, timeout: Duration) -> Self {
        Self {
            browser,
            classifier,
            timeout,
        }
    }

    /// Log in as `probing_identity`, then probe every locator in `targets`.
    pub async fn probe(
        &mut self,
        targets: &LocatorSet,
        probing_identity: &Identity,
        owner_scope: &str,
    ) -> Result<Vec<ProbeOutcome>, LoginError> {
        let login_url = Locator::parse(&probing_identity.login_url)
            .map_err(|_| NavigationError::InvalidUrl(probing_identity.login_url.clone()))?;

        match tokio::time::timeout(self.timeout, self.browser.login(probing_identity, &login_url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(LoginError::Navigation(NavigationError::Timeout {
                    url: login_url.to_string(),
                    duration: self.timeout,
                }))
            }
        }

        info!(
            prober = %probing_identity.label,
            targets = targets.len(),
            scope = owner_scope,
            "starting probe run"
        );

        let mut outcomes = Vec::with_capacity(targets.len());
        for locator in targets {
            let outcome = self
                .probe_one(locator, &probing_identity.label, owner_scope)
                .await;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Probe a single locator in the already established session.
    pub async fn probe_one(&mut self, locator: &Locator, prober: &str, owner_scope: &str) -> ProbeOutcome {
        match self.navigate(locator).await {
            Ok(page) => {
                let verdict = self.classifier.classify(locator, &page, owner_scope);
                match verdict.outcome {
                    Outcome::Success => warn!(url = %locator, prober, "authorization bypass successful"),
                    _ => info!(url = %locator, prober, outcome = %verdict.outcome, "probe classified"),
                }
                ProbeOutcome {
                    locator: locator.clone(),
                    prober: prober.to_string(),
                    outcome: verdict.outcome,
                    reason: verdict.reason,
                    observed_url: Some(page.final_url),
                }
            }
            Err(e) => {
                error!(url = %locator, prober, error = %e, "probe failed");
                ProbeOutcome {
                    locator: locator.clone(),
                    prober: prober.to_string(),
                    outcome: Outcome::Error,
                    reason: format!("Failed to access {}: {}", locator, e),
                    observed_url: None,
                }
            }
        }
    }

    async fn navigate(&mut self, locator: &Locator) -> Result<Page, NavigationError> {
        match tokio::time::timeout(self.timeout, self.browser.navigate(locator)).await {
            Ok(result) => result,
            Err(_) => Err(NavigationError::Timeout {
                url: locator.to_string(),
                duration: self.timeout,
            }),
        }
    }
}
