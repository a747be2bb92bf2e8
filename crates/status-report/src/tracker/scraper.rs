//! Issue list scraping from the tracker's HTML search page.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderValue, COOKIE};
use url::Url;

use super::cookies::{cookies_for_domain, CookieStore};
use super::{IssueRef, IssueSource};
use crate::config::{Config, JiraConfig};
use crate::error::TrackerError;

/// Issue key and summary cells both render as this anchor, key first.
static ISSUE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a class="issue-link" data-issue-key=[^>]+>([^<]+)</a>"#)
        .expect("valid issue link pattern")
});

/// Scrapes the open issue list from the tracker web UI using browser cookies.
pub struct JiraScraper {
    client: reqwest::Client,
    host: String,
    filter: String,
    stores: Vec<CookieStore>,
}

impl JiraScraper {
    /// Create a scraper reading cookies from the given stores.
    pub fn new(jira: &JiraConfig, stores: Vec<CookieStore>) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("status-report/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            host: jira.host.clone(),
            filter: jira.filter.clone(),
            stores,
        })
    }

    /// Create a scraper from the full configuration, discovering cookie stores.
    pub fn from_config(config: &Config) -> Result<Self, TrackerError> {
        Self::new(&config.jira, CookieStore::discover(&config.cookies))
    }

    /// URL of the filtered issue list page.
    pub fn issues_url(&self) -> Result<Url, TrackerError> {
        let mut url = Url::parse(&self.host)?.join("issues/")?;
        url.query_pairs_mut().append_pair("filter", &self.filter);
        Ok(url)
    }

    /// `Cookie` header value for the tracker host, if the browser has any.
    fn cookie_header(&self) -> Result<Option<HeaderValue>, TrackerError> {
        let domain = Url::parse(&self.host)?
            .host_str()
            .map(str::to_owned)
            .unwrap_or_default();
        let cookies = cookies_for_domain(&self.stores, &domain);
        if cookies.is_empty() {
            tracing::warn!(domain = %domain, "Got 0 cookies for tracker, request will be unauthenticated");
            return Ok(None);
        }

        tracing::debug!(domain = %domain, count = cookies.len(), "Attaching browser cookies");
        let header = cookies
            .iter()
            .map(|c| c.header_pair())
            .collect::<Vec<_>>()
            .join("; ");
        Ok(Some(HeaderValue::from_str(&header)?))
    }
}

#[async_trait]
impl IssueSource for JiraScraper {
    async fn fetch_issues(&self) -> Result<Vec<IssueRef>, TrackerError> {
        let url = self.issues_url()?;
        tracing::info!(url = %url, "Fetching open issues");

        let mut request = self.client.get(url);
        if let Some(cookie) = self.cookie_header()? {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Tracker answered with non-success status");
        }
        let body = response.text().await?;

        let issues = parse_issue_list(&body);
        tracing::info!(count = issues.len(), "Fetched open issues");
        Ok(issues)
    }
}

/// Extract issues from the issue list HTML.
///
/// Every issue contributes two consecutive issue links, the key then the
/// summary, so matches are paired in document order. A trailing unpaired
/// match is dropped.
#[must_use]
pub fn parse_issue_list(html: &str) -> Vec<IssueRef> {
    let texts: Vec<&str> = ISSUE_LINK
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    let pairs = texts.chunks_exact(2);
    if !pairs.remainder().is_empty() {
        tracing::warn!(
            text = pairs.remainder()[0],
            "Odd number of issue links, dropping the last one"
        );
    }

    pairs
        .map(|pair| IssueRef::new(pair[0], pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(key: &str, text: &str) -> String {
        format!(r#"<a class="issue-link" data-issue-key="{key}" href="/browse/{key}">{text}</a>"#)
    }

    #[test]
    fn test_pairs_links_in_order() {
        let html = format!(
            "<table><tr><td>{}</td><td>{}</td></tr><tr><td>{}</td><td>{}</td></tr></table>",
            link("A1", "A1"),
            link("A1", "Title A"),
            link("B2", "B2"),
            link("B2", "Title B"),
        );
        assert_eq!(
            parse_issue_list(&html),
            vec![IssueRef::new("A1", "Title A"), IssueRef::new("B2", "Title B")]
        );
    }

    #[test]
    fn test_ignores_other_anchors() {
        let html = format!(
            r#"<a class="issue-link">no key</a>{}<a href="/x">nav</a>{}"#,
            link("C3", "C3"),
            link("C3", "Title C"),
        );
        assert_eq!(parse_issue_list(&html), vec![IssueRef::new("C3", "Title C")]);
    }

    #[test]
    fn test_odd_match_count_drops_last() {
        let html = format!("{}{}{}", link("A1", "A1"), link("A1", "Title A"), link("B2", "B2"));
        assert_eq!(parse_issue_list(&html), vec![IssueRef::new("A1", "Title A")]);
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_issue_list("<html><body>Log in</body></html>").is_empty());
    }

    #[test]
    fn test_issues_url() {
        let jira = JiraConfig {
            host: "https://tracker.example.com/".to_string(),
            filter: "40605".to_string(),
        };
        let scraper = JiraScraper::new(&jira, Vec::new()).unwrap();
        assert_eq!(
            scraper.issues_url().unwrap().as_str(),
            "https://tracker.example.com/issues/?filter=40605"
        );
    }

    #[test]
    fn test_issues_url_keeps_context_path() {
        let jira = JiraConfig {
            host: "https://example.com/jira/".to_string(),
            filter: "7".to_string(),
        };
        let scraper = JiraScraper::new(&jira, Vec::new()).unwrap();
        assert_eq!(
            scraper.issues_url().unwrap().as_str(),
            "https://example.com/jira/issues/?filter=7"
        );
    }
}
