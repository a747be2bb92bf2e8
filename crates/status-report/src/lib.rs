//! Daily status report pipeline.
//!
//! This crate provides:
//! - Open issue scraping from the tracker web UI using browser session cookies
//! - A draft file seeded with fetched issues and edited by hand
//! - Prefix-driven formatting of the draft into an HTML mail message
//! - Submission over SMTPS, or a browser preview for dry runs

pub mod config;
pub mod draft;
pub mod error;
pub mod mail;
pub mod pipeline;
pub mod preview;
pub mod report;
pub mod tracker;

// Re-export main types
pub use config::Config;
pub use draft::DraftFile;
pub use pipeline::{Pipeline, RunOptions, RunOutcome};
pub use report::{LineKind, ReportGenerator};
pub use tracker::{IssueRef, IssueSource, JiraScraper};
