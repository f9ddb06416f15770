// HTTP browser for twinprobe
// reqwest client with a cookie store standing in for a real browser session

use super::forms::{find_login_form, missing_fields, parse_forms};
use super::Browser;
use crate::config::ProbeSettings;
use crate::errors::{LoginError, NavigationError};
use crate::models::{Identity, Locator, Page};
use reqwest::{redirect, Client, Response};
use std::time::Duration;
use tracing::{debug, info};

const MAX_REDIRECTS: usize = 10;

/// Fetches pages over HTTP, keeping cookies between requests.
///
/// Markup is taken as served; script-rendered content is not executed.
pub struct HttpBrowser {
    client: Client,
    timeout: Duration,
    user_agent: String,
    current: Option<Page>,
}

impl HttpBrowser {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, NavigationError> {
        let client = Self::build_client(timeout, user_agent)?;
        Ok(Self {
            client,
            timeout,
            user_agent: user_agent.to_string(),
            current: None,
        })
    }

    pub fn from_settings(settings: &ProbeSettings) -> Result<Self, NavigationError> {
        Self::new(settings.timeout(), &settings.user_agent)
    }

    fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, NavigationError> {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| NavigationError::Driver(e.to_string()))
    }

    /// Drop all cookies by starting a fresh client.
    fn reset_session(&mut self) -> Result<(), NavigationError> {
        self.client = Self::build_client(self.timeout, &self.user_agent)?;
        self.current = None;
        Ok(())
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current.as_ref()
    }

    async fn read_page(&mut self, requested: &Locator, resp: Response) -> Result<Page, NavigationError> {
        let status = resp.status().as_u16();
        let final_url = Locator::from(resp.url().clone());
        let body = resp
            .text()
            .await
            .map_err(|e| NavigationError::from_reqwest(requested.as_str(), e, self.timeout))?;

        debug!(url = %requested, final_url = %final_url, status, bytes = body.len(), "page loaded");
        let page = Page {
            requested: requested.clone(),
            final_url,
            status,
            body,
        };
        self.current = Some(page.clone());
        Ok(page)
    }
}

impl Browser for HttpBrowser {
    async fn login(&mut self, identity: &Identity, login_url: &Locator) -> Result<(), LoginError> {
        info!(identity = %identity.label, url = %login_url, "logging in");
        self.reset_session()?;

        let login_page = self.navigate(login_url).await?;
        let field_names: Vec<&str> = identity.credentials.iter().map(|c| c.field.as_str()).collect();

        let form = match find_login_form(&login_page.body, &field_names) {
            Some(form) => form,
            None => {
                let url = login_page.final_url.to_string();
                if parse_forms(&login_page.body).is_empty() {
                    return Err(LoginError::FormNotFound { url });
                }
                return Err(match missing_fields(&login_page.body, &field_names).first() {
                    Some(field) => LoginError::MissingField {
                        url,
                        field: field.to_string(),
                    },
                    None => LoginError::FormNotFound { url },
                });
            }
        };

        let target = match &form.action {
            Some(action) => login_page
                .final_url
                .join(action)
                .map_err(|_| NavigationError::InvalidUrl(action.clone()))?,
            None => login_page.final_url.clone(),
        };

        let credentials: Vec<(String, String)> = identity
            .credentials
            .iter()
            .map(|c| (c.field.clone(), c.value.clone()))
            .collect();
        let fields = form.submission(&credentials, &identity.submit_id);

        let request = if form.is_post() {
            self.client.post(target.as_str()).form(&fields)
        } else {
            self.client.get(target.as_str()).query(&fields)
        };
        let resp = request
            .send()
            .await
            .map_err(|e| NavigationError::from_reqwest(target.as_str(), e, self.timeout))?;
        let landed = self.read_page(&target, resp).await?;

        if landed.status >= 400 {
            return Err(LoginError::Rejected {
                status: landed.status,
            });
        }
        if find_login_form(&landed.body, &field_names).is_some() {
            return Err(LoginError::NotEstablished);
        }

        info!(identity = %identity.label, landed = %landed.final_url, "session established");
        Ok(())
    }

    async fn navigate(&mut self, url: &Locator) -> Result<Page, NavigationError> {
        let resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| NavigationError::from_reqwest(url.as_str(), e, self.timeout))?;
        self.read_page(url, resp).await
    }

    fn page_source(&self) -> &str {
        self.current.as_ref().map_or("", |p| p.body.as_str())
    }
}
