//! Issue tracker access.
//!
//! Provides browser-cookie authentication and scraping of the tracker's
//! issue list page.

mod cookies;
mod scraper;

use async_trait::async_trait;

use crate::error::TrackerError;

pub use cookies::{cookies_for_domain, parse_netscape, BrowserCookie, CookieStore};
pub use scraper::{parse_issue_list, JiraScraper};

/// An open issue as listed by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    /// Issue key, e.g. `PROJ-12`.
    pub id: String,
    /// Issue summary.
    pub title: String,
}

impl IssueRef {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Source of the user's open issues.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueSource {
    /// Fetch the open issues, in tracker order.
    async fn fetch_issues(&self) -> Result<Vec<IssueRef>, TrackerError>;
}
