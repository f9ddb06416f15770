// Browser collaborator for twinprobe
// One exclusively owned session: log in, navigate, read the current page

pub mod forms;
pub mod http;

pub use http::HttpBrowser;

use crate::errors::{LoginError, NavigationError};
use crate::models::{Identity, Locator, Page};

/// A controlled browser session.
///
/// Every call mutates the session (cookies, current address), so callers own
/// it exclusively and issue one operation at a time.
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Establish an authenticated session as `identity`, replacing any
    /// previous one.
    async fn login(&mut self, identity: &Identity, login_url: &Locator) -> Result<(), LoginError>;

    /// Load `url`, following redirects.
    async fn navigate(&mut self, url: &Locator) -> Result<Page, NavigationError>;

    /// Body of the most recently loaded page, empty before any navigation.
    fn page_source(&self) -> &str;
}
