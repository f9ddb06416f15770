// Scripted in-memory browser for driving the prober and pipeline in tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;
use twinprobe::browser::Browser;
use twinprobe::errors::{LoginError, NavigationError};
use twinprobe::models::{CredentialField, Identity, Locator, Page};

#[derive(Debug, Clone)]
pub enum Script {
    Page { final_url: String, status: u16, body: String },
    Fail(String),
    Hang,
}

impl Script {
    pub fn ok(body: &str) -> Self {
        Script::Page { final_url: String::new(), status: 200, body: body.to_string() }
    }

    pub fn redirect(final_url: &str, body: &str) -> Self {
        Script::Page { final_url: final_url.to_string(), status: 200, body: body.to_string() }
    }
}

#[derive(Default)]
pub struct ScriptedBrowser {
    /// Responses seen only while logged in as a given identity.
    per_identity: HashMap<(String, String), Script>,
    /// Responses for any session.
    shared: HashMap<String, Script>,
    /// Login for this label fails from the given attempt number (1-based).
    fail_login_from: HashMap<String, usize>,
    login_attempts: HashMap<String, usize>,
    session: Option<String>,
    source: String,
    /// "login:<label>" and "nav:<url>" entries in call order.
    pub log: Vec<String>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, script: Script) -> Self {
        self.shared.insert(normalize(url), script);
        self
    }

    pub fn page_for(mut self, label: &str, url: &str, script: Script) -> Self {
        self.per_identity.insert((label.to_string(), normalize(url)), script);
        self
    }

    pub fn fail_login(self, label: &str) -> Self {
        self.fail_login_from_attempt(label, 1)
    }

    pub fn fail_login_from_attempt(mut self, label: &str, attempt: usize) -> Self {
        self.fail_login_from.insert(label.to_string(), attempt);
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log
            .iter()
            .filter_map(|e| e.strip_prefix("nav:").map(|s| s.to_string()))
            .collect()
    }

    fn script_for(&self, url: &str) -> Option<Script> {
        if let Some(label) = &self.session {
            if let Some(script) = self.per_identity.get(&(label.clone(), url.to_string())) {
                return Some(script.clone());
            }
        }
        self.shared.get(url).cloned()
    }
}

fn normalize(url: &str) -> String {
    Locator::parse(url).map(|l| l.to_string()).unwrap_or_else(|_| url.to_string())
}

impl Browser for ScriptedBrowser {
    async fn login(&mut self, identity: &Identity, _login_url: &Locator) -> Result<(), LoginError> {
        self.log.push(format!("login:{}", identity.label));
        let attempt = {
            let n = self.login_attempts.entry(identity.label.clone()).or_insert(0);
            *n += 1;
            *n
        };
        if let Some(from) = self.fail_login_from.get(&identity.label) {
            if attempt >= *from {
                self.session = None;
                return Err(LoginError::NotEstablished);
            }
        }
        self.session = Some(identity.label.clone());
        Ok(())
    }

    async fn navigate(&mut self, url: &Locator) -> Result<Page, NavigationError> {
        self.log.push(format!("nav:{}", url));
        match self.script_for(url.as_str()) {
            Some(Script::Page { final_url, status, body }) => {
                let final_url = if final_url.is_empty() {
                    url.clone()
                } else {
                    Locator::parse(&final_url).map_err(|_| NavigationError::InvalidUrl(final_url.clone()))?
                };
                self.source = body.clone();
                Ok(Page { requested: url.clone(), final_url, status, body })
            }
            Some(Script::Fail(message)) => Err(NavigationError::Transport {
                url: url.to_string(),
                message,
            }),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(NavigationError::Driver("hung".to_string()))
            }
            None => {
                self.source = "<h1>404 Not Found</h1>".to_string();
                Ok(Page {
                    requested: url.clone(),
                    final_url: url.clone(),
                    status: 404,
                    body: self.source.clone(),
                })
            }
        }
    }

    fn page_source(&self) -> &str {
        &self.source
    }
}

pub fn identity(label: &str) -> Identity {
    Identity::new(
        label,
        "https://app.example.com/login",
        vec![
            CredentialField::new("username", label),
            CredentialField::new("password", &format!("{}-secret", label)),
        ],
    )
}

pub fn loc(s: &str) -> Locator {
    Locator::parse(s).unwrap()
}
