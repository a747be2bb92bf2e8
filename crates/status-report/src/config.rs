//! Configuration for the status report pipeline.
//!
//! Loaded once per run from a TOML file and passed by reference to every
//! stage that needs it.

use std::path::{Path, PathBuf};

use lettre::message::Mailbox;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default saved tracker filter listing the user's open issues.
pub const DEFAULT_JIRA_FILTER: &str = "40605";

/// Default SMTPS port (implicit TLS).
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Default sign-off line placed above the author name.
pub const DEFAULT_SIGN_OFF: &str = "С уважением,";

/// Report text settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Name shown in the `From:` header and the signature.
    pub author_name: String,
    /// Subject line text placed before the date label.
    pub subject_prefix: String,
    /// Draft lines starting with this are rendered as tracker tasks.
    pub task_prefix: String,
    /// Line placed between the separator and the author name.
    #[serde(default = "default_sign_off")]
    pub sign_off: String,
}

/// Issue tracker settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraConfig {
    /// Base URL, always ending with `/` after loading.
    pub host: String,
    /// Saved filter id used for the issue list.
    #[serde(default = "default_jira_filter")]
    pub filter: String,
}

/// SMTP submission settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MailConfig {
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Skip certificate validation for the mail host.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SMTP_PORT,
            accept_invalid_certs: false,
        }
    }
}

/// Browser cookie store settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CookieConfig {
    /// Explicit cookie store. `*.sqlite` is read as a Firefox database,
    /// anything else as a Netscape `cookies.txt`. When unset, Firefox
    /// profiles are discovered automatically.
    pub file: Option<PathBuf>,
}

/// Complete tool configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Draft file edited by the user.
    pub input_file: PathBuf,
    /// Sender address, also the SMTP login.
    pub my_email: String,
    /// Default recipient.
    pub work_email: String,
    /// SMTP host.
    pub smtp_host: String,
    pub report: ReportConfig,
    #[serde(alias = "JIRA")]
    pub jira: JiraConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
    /// Editor command line; falls back to `$VISUAL`, `$EDITOR`, then `vim`.
    pub editor: Option<String>,
    /// Preview browser command line; falls back to the system browser.
    pub browser: Option<String>,
}

fn default_sign_off() -> String {
    DEFAULT_SIGN_OFF.to_string()
}

fn default_jira_filter() -> String {
    DEFAULT_JIRA_FILTER.to_string()
}

const fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.input_file.as_os_str().is_empty() {
            return Err(ConfigError::Empty("input-file"));
        }
        for (field, value) in [
            ("smtp-host", &self.smtp_host),
            ("report.author-name", &self.report.author_name),
            ("report.task-prefix", &self.report.task_prefix),
            ("jira.host", &self.jira.host),
            ("jira.filter", &self.jira.filter),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }
        for (field, value) in [("my-email", &self.my_email), ("work-email", &self.work_email)] {
            if value.parse::<Mailbox>().is_err() {
                return Err(ConfigError::InvalidEmail {
                    field,
                    value: value.clone(),
                });
            }
        }

        let host = Url::parse(&self.jira.host)?;
        if !matches!(host.scheme(), "http" | "https")
            || !host.host_str().is_some_and(|name| !name.is_empty())
        {
            return Err(ConfigError::UnsupportedHost(self.jira.host.clone()));
        }
        if !self.jira.host.ends_with('/') {
            self.jira.host.push('/');
        }
        Ok(())
    }

    /// Recipient for this run: the sender's own address or the work address.
    #[must_use]
    pub fn recipient(&self, to_me: bool) -> &str {
        if to_me {
            &self.my_email
        } else {
            &self.work_email
        }
    }
}
