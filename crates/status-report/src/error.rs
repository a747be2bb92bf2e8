//! Error types for the status report pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A required field is present but empty
    #[error("config field `{0}` must not be empty")]
    Empty(&'static str),

    /// An email field does not hold a valid address
    #[error("config field `{field}` is not a valid email address: {value}")]
    InvalidEmail { field: &'static str, value: String },

    /// The tracker host is not an absolute URL
    #[error("config field `jira.host` is not a valid URL: {0}")]
    InvalidHost(#[from] url::ParseError),

    /// The tracker host is a URL, but not an http(s) origin
    #[error("config field `jira.host` must be an http or https URL with a host: {0}")]
    UnsupportedHost(String),
}

/// `--days` offset that moves the report date outside the calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("date offset of {0} days is out of range")]
pub struct DateOutOfRange(pub i64);

/// Errors raised while fetching issues from the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The issue list URL could not be built
    #[error("invalid tracker URL: {0}")]
    Url(#[from] url::ParseError),

    /// Cookie header value contained characters HTTP does not allow
    #[error("invalid cookie header: {0}")]
    CookieHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// HTTP request or body read failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while reading a browser cookie store.
#[derive(Debug, Error)]
pub enum CookieError {
    /// Store file could not be read or copied
    #[error("failed to read cookie store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// SQLite store could not be queried
    #[error("failed to query cookie database: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors raised by the draft file manager and the editor session.
#[derive(Debug, Error)]
pub enum DraftError {
    /// Draft file I/O failed
    #[error("draft file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Draft holds bytes that are not UTF-8 text
    #[error("draft file {path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Editor command line could not be split into words
    #[error("invalid editor command `{command}`: {source}")]
    EditorCommand {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },

    /// Editor command is empty after splitting
    #[error("editor command is empty")]
    EmptyEditor,

    /// Editor process could not be started
    #[error("failed to launch editor `{program}`: {source}")]
    EditorSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Editor exited unsuccessfully
    #[error("editor `{program}` exited with {status}")]
    EditorStatus {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Errors raised while prompting for credentials or submitting mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// Password prompt failed (no terminal, read error)
    #[error("failed to read password: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Sender or recipient is not a valid address
    #[error("invalid address `{value}`: {source}")]
    Address {
        value: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// Envelope could not be built
    #[error("invalid envelope: {0}")]
    Envelope(#[from] lettre::error::Error),

    /// TLS parameters or the SMTP session failed
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Errors raised by preview mode.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Temporary file could not be created or written
    #[error("failed to write preview file: {0}")]
    Io(#[from] std::io::Error),

    /// Browser command line could not be split into words
    #[error("invalid browser command `{command}`: {source}")]
    BrowserCommand {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },

    /// Browser command is empty after splitting
    #[error("browser command is empty")]
    EmptyBrowser,

    /// Browser process could not be started
    #[error("failed to launch browser for {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Browser exited unsuccessfully
    #[error("browser `{program}` exited with {status}")]
    BrowserStatus {
        program: String,
        status: std::process::ExitStatus,
    },
}
