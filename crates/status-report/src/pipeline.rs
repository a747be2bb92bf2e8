//! Report pipeline - orchestrates the fetch-edit-format-deliver flow.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::Config;
use crate::draft::{resolve_editor, DraftFile};
use crate::mail::{prompt_password, MailSender};
use crate::preview::preview;
use crate::report::{date_label, ReportGenerator};
use crate::tracker::{IssueRef, IssueSource};

/// Per-run options from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Offset in days from today for the date label.
    pub days: i64,
    /// Address the report to the sender instead of the work address.
    pub to_me: bool,
    /// Literal date label overriding `days`.
    pub force_date: Option<String>,
    /// Preview in a browser instead of sending.
    pub dry_run: bool,
    /// Leave the draft's issue comments untouched.
    pub no_fetch: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Report mailed to this address.
    Sent { to: String },
    /// Report written to this preview file.
    Previewed { path: PathBuf },
}

/// Fetch open issues and rewrite the draft's comment lines with them.
pub async fn refresh_draft<S>(source: &S, draft: &DraftFile) -> Result<Vec<IssueRef>>
where
    S: IssueSource + ?Sized,
{
    let issues = source
        .fetch_issues()
        .await
        .context("Failed to fetch open issues")?;
    draft
        .refresh(&issues)
        .context("Failed to update draft file")?;
    Ok(issues)
}

/// Report pipeline for a single run.
pub struct Pipeline<'a> {
    config: &'a Config,
    options: RunOptions,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(config: &'a Config, options: RunOptions) -> Self {
        Self { config, options }
    }

    #[must_use]
    pub fn draft(&self) -> DraftFile {
        DraftFile::new(&self.config.input_file)
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        self.config.recipient(self.options.to_me)
    }

    pub fn date_label(&self) -> Result<String> {
        date_label(
            Local::now().date_naive(),
            self.options.days,
            self.options.force_date.as_deref(),
        )
        .context("Failed to compute report date")
    }

    /// Format the report from the draft's current contents.
    pub fn build_report(&self, date: &str) -> Result<String> {
        let text = self
            .draft()
            .read()
            .context("Failed to read edited draft")?;
        Ok(ReportGenerator::generate(
            self.config,
            &text,
            self.recipient(),
            date,
        ))
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run<S>(&self, source: &S) -> Result<RunOutcome>
    where
        S: IssueSource + ?Sized,
    {
        let to = self.recipient().to_string();
        let date = self.date_label()?;
        let draft = self.draft();
        tracing::info!(to = %to, date = %date, dry_run = self.options.dry_run, "Starting report run");

        if self.options.no_fetch {
            tracing::info!("Skipping issue fetch");
        } else {
            refresh_draft(source, &draft).await?;
        }

        let editor = resolve_editor(self.config.editor.as_deref());
        draft.edit(&editor).context("Editing the draft failed")?;
        println!();

        let report = self.build_report(&date)?;

        if self.options.dry_run {
            let path = preview(&report, self.config.browser.as_deref())
                .context("Failed to open report preview")?;
            return Ok(RunOutcome::Previewed { path });
        }

        let password =
            prompt_password(&self.config.my_email).context("Failed to read mail password")?;
        MailSender::new(self.config)
            .send(&report, &to, password)
            .await
            .context("Failed to send report")?;
        Ok(RunOutcome::Sent { to })
    }
}
