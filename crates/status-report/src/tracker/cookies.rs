//! Browser cookie store access.
//!
//! Reads the session cookies the user's browser already holds for the
//! tracker, so the tool never handles tracker credentials itself.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config::CookieConfig;
use crate::error::CookieError;

/// Prefix Netscape cookie files put in front of HttpOnly cookie domains.
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// A cookie read from a browser store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookie {
    /// Domain the cookie is scoped to, e.g. `.example.com`.
    pub domain: String,
    pub name: String,
    pub value: String,
}

impl BrowserCookie {
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// `name=value` pair for a `Cookie` header.
    #[must_use]
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// A browser cookie store on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieStore {
    /// Firefox `cookies.sqlite`.
    Firefox(PathBuf),
    /// Netscape-format `cookies.txt`.
    Netscape(PathBuf),
}

impl CookieStore {
    /// Classify a store file by its extension.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        if path.extension().is_some_and(|ext| ext == "sqlite") {
            Self::Firefox(path)
        } else {
            Self::Netscape(path)
        }
    }

    /// Stores to read for this configuration: the configured file, or every
    /// Firefox profile found on this machine.
    #[must_use]
    pub fn discover(config: &CookieConfig) -> Vec<Self> {
        if let Some(file) = &config.file {
            return vec![Self::from_path(file.clone())];
        }

        let Some(root) = firefox_profiles_root() else {
            tracing::debug!("No home directory, skipping cookie discovery");
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(&root) else {
            tracing::debug!(root = %root.display(), "No Firefox profile directory");
            return Vec::new();
        };

        let mut stores: Vec<Self> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path().join("cookies.sqlite"))
            .filter(|path| path.is_file())
            .map(Self::Firefox)
            .collect();
        stores.sort_by(|a, b| a.path().cmp(b.path()));
        stores
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Firefox(path) | Self::Netscape(path) => path,
        }
    }

    /// Read every cookie in the store.
    pub fn read(&self) -> Result<Vec<BrowserCookie>, CookieError> {
        match self {
            Self::Firefox(path) => read_firefox(path),
            Self::Netscape(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| CookieError::Io {
                        path: path.clone(),
                        source,
                    })?;
                Ok(parse_netscape(&content))
            }
        }
    }
}

/// Collect the cookies whose domain ends with `domain` from all stores.
///
/// Unreadable stores are logged and skipped. An empty domain matches nothing.
#[must_use]
pub fn cookies_for_domain(stores: &[CookieStore], domain: &str) -> Vec<BrowserCookie> {
    if domain.is_empty() {
        tracing::warn!("Tracker URL has no host, not attaching any cookies");
        return Vec::new();
    }
    let mut matched = Vec::new();
    for store in stores {
        match store.read() {
            Ok(cookies) => {
                let before = matched.len();
                matched.extend(cookies.into_iter().filter(|c| c.domain.ends_with(domain)));
                tracing::debug!(
                    store = %store.path().display(),
                    matched = matched.len() - before,
                    "Read cookie store"
                );
            }
            Err(e) => {
                tracing::warn!(store = %store.path().display(), error = %e, "Skipping cookie store");
            }
        }
    }
    matched
}

#[cfg(target_os = "macos")]
fn firefox_profiles_root() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Firefox").join("Profiles"))
}

#[cfg(target_os = "windows")]
fn firefox_profiles_root() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Mozilla").join("Firefox").join("Profiles"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn firefox_profiles_root() -> Option<PathBuf> {
    dirs::home_dir().map(|dir| dir.join(".mozilla").join("firefox"))
}

/// Query a Firefox cookie database through a private copy, since a running
/// browser holds a lock on the live file.
fn read_firefox(path: &Path) -> Result<Vec<BrowserCookie>, CookieError> {
    let io_err = |source: std::io::Error| CookieError::Io {
        path: path.to_path_buf(),
        source,
    };

    let scratch = tempfile::tempdir().map_err(io_err)?;
    let copy = scratch.path().join("cookies.sqlite");
    std::fs::copy(path, &copy).map_err(io_err)?;

    let wal = path.with_extension("sqlite-wal");
    if wal.is_file() {
        std::fs::copy(&wal, scratch.path().join("cookies.sqlite-wal")).map_err(io_err)?;
    }

    let conn = Connection::open(&copy)?;
    let mut stmt = conn.prepare("SELECT host, name, value FROM moz_cookies")?;
    let cookies = stmt
        .query_map([], |row| {
            Ok(BrowserCookie {
                domain: row.get(0)?,
                name: row.get(1)?,
                value: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cookies)
}

/// Parse a Netscape `cookies.txt` file.
///
/// Fields are tab separated: domain, subdomain flag, path, secure flag,
/// expiry, name, value. Malformed lines are skipped.
#[must_use]
pub fn parse_netscape(content: &str) -> Vec<BrowserCookie> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.strip_prefix(HTTP_ONLY_PREFIX).unwrap_or(line);
            if line.trim().is_empty() || line.starts_with('#') {
                return None;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                tracing::debug!(line, "Skipping malformed cookie line");
                return None;
            }
            Some(BrowserCookie::new(fields[0], fields[5], fields[6].trim_end()))
        })
        .collect()
}
