//! Report formatting.
//!
//! Turns the edited draft into the HTML mail message. Every draft line is
//! classified by prefix and rendered on its own; classification order is
//! fixed (task, other, comment, plain) and the first match wins, since the
//! configured task prefix may overlap the built-in ones.

use std::fmt::Write;

use chrono::{NaiveDate, TimeDelta};

use crate::config::Config;
use crate::draft::{COMMENT_PREFIX, OTHER_PREFIX};
use crate::error::DateOutOfRange;

/// Date format used in the subject line.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// A classified draft line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Tracked issue: key and optional summary.
    Task { id: &'a str, rest: Option<&'a str> },
    /// Untracked accomplishment, prefix removed.
    Other(&'a str),
    /// Never rendered.
    Comment,
    /// Anything else, rendered as a nested sub-point.
    Plain(&'a str),
}

impl<'a> LineKind<'a> {
    /// Classify a line. Checks run in declaration order.
    #[must_use]
    pub fn classify(line: &'a str, task_prefix: &str) -> Self {
        if line.starts_with(task_prefix) {
            let (id, rest) = match line.split_once(' ') {
                Some((id, rest)) => (id, Some(rest)),
                None => (line, None),
            };
            Self::Task { id, rest }
        } else if let Some(rest) = line.strip_prefix(OTHER_PREFIX) {
            Self::Other(rest)
        } else if line.starts_with(COMMENT_PREFIX) {
            Self::Comment
        } else {
            Self::Plain(line)
        }
    }

    fn render(self, out: &mut String, tracker_host: &str) {
        match self {
            Self::Task { id, rest } => {
                let _ = write!(
                    out,
                    r#"<li><b><a href="{tracker_host}browse/{id}">{id}</a>"#
                );
                if let Some(rest) = rest {
                    out.push(' ');
                    out.push_str(rest);
                }
                out.push_str("</b></li>");
            }
            Self::Other(rest) => {
                let _ = write!(out, "<li>{rest}</li>");
            }
            Self::Comment => {}
            Self::Plain(line) => {
                let _ = write!(out, r#"<ul type="circle"><li>{line}</li></ul>"#);
            }
        }
    }
}

/// Generates the report message from draft text.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Build the full message: mail headers, then the HTML body.
    ///
    /// Pure: the same inputs always give the same bytes.
    #[must_use]
    pub fn generate(config: &Config, text: &str, to: &str, date: &str) -> String {
        let report = &config.report;
        let mut msg = String::new();

        let _ = write!(
            msg,
            "From: {author}<{from}>\nTo: {to}\nSubject: {subject}{date}\n\
             MIME-Version: 1.0\nContent-Type: text/html; charset=UTF-8\n",
            author = report.author_name,
            from = config.my_email,
            subject = report.subject_prefix,
        );
        msg.push_str(r#"<ul type="disc">"#);

        for line in text.trim().split('\n') {
            LineKind::classify(line, &report.task_prefix).render(&mut msg, &config.jira.host);
        }

        let _ = write!(
            msg,
            "</ul>\n<br><br>--<br>{sign_off}<br>{author}",
            sign_off = report.sign_off,
            author = report.author_name,
        );
        msg
    }
}

/// Date label for the subject line: `today + days`, unless forced.
pub fn date_label(
    today: NaiveDate,
    days: i64,
    forced: Option<&str>,
) -> Result<String, DateOutOfRange> {
    if let Some(forced) = forced.filter(|f| !f.is_empty()) {
        return Ok(forced.to_string());
    }
    let date = TimeDelta::try_days(days)
        .and_then(|delta| today.checked_add_signed(delta))
        .ok_or(DateOutOfRange(days))?;
    Ok(date.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample;

    fn render_line(line: &str) -> String {
        let config = sample();
        let mut out = String::new();
        LineKind::classify(line, &config.report.task_prefix).render(&mut out, &config.jira.host);
        out
    }

    #[test]
    fn test_task_line() {
        assert_eq!(
            render_line("PROJ-12 Fix login bug"),
            r#"<li><b><a href="https://tracker.example.com/browse/PROJ-12">PROJ-12</a> Fix login bug</b></li>"#
        );
    }

    #[test]
    fn test_task_line_without_title() {
        assert_eq!(
            render_line("PROJ-12"),
            r#"<li><b><a href="https://tracker.example.com/browse/PROJ-12">PROJ-12</a></b></li>"#
        );
    }

    #[test]
    fn test_other_line() {
        assert_eq!(
            render_line("OTHER Helped onboard new teammate"),
            "<li>Helped onboard new teammate</li>"
        );
    }

    #[test]
    fn test_comment_line() {
        assert_eq!(render_line("#PROJ-99 stale ticket"), "");
    }

    #[test]
    fn test_plain_line() {
        assert_eq!(
            render_line("Reviewed three pull requests"),
            r#"<ul type="circle"><li>Reviewed three pull requests</li></ul>"#
        );
    }

    #[test]
    fn test_blank_line_is_plain() {
        assert_eq!(render_line(""), r#"<ul type="circle"><li></li></ul>"#);
    }

    #[test]
    fn test_task_prefix_wins_over_other() {
        assert_eq!(
            LineKind::classify("OTHER-5 overlap", "OTHER"),
            LineKind::Task {
                id: "OTHER-5",
                rest: Some("overlap")
            }
        );
        assert_eq!(
            LineKind::classify("OTHER x", "OTHER"),
            LineKind::Task {
                id: "OTHER",
                rest: Some("x")
            }
        );
    }

    #[test]
    fn test_task_prefix_wins_over_comment() {
        assert!(matches!(
            LineKind::classify("#5 hashtag task", "#"),
            LineKind::Task { id: "#5", .. }
        ));
    }

    #[test]
    fn test_full_message() {
        let config = sample();
        let text = "\n\nPROJ-1 Ship it\n  details\n#PROJ-2 later\nOTHER Interviews\n\n";
        let msg = ReportGenerator::generate(&config, text, "team@example.com", "18.10.2026");

        let expected = concat!(
            "From: Jane Doe<me@example.com>\n",
            "To: team@example.com\n",
            "Subject: Status report 18.10.2026\n",
            "MIME-Version: 1.0\n",
            "Content-Type: text/html; charset=UTF-8\n",
            r#"<ul type="disc">"#,
            r#"<li><b><a href="https://tracker.example.com/browse/PROJ-1">PROJ-1</a> Ship it</b></li>"#,
            r#"<ul type="circle"><li>  details</li></ul>"#,
            "<li>Interviews</li>",
            "</ul>\n<br><br>--<br>С уважением,<br>Jane Doe",
        );
        assert_eq!(msg, expected);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = sample();
        let text = "PROJ-3 a\nb\nOTHER c";
        let first = ReportGenerator::generate(&config, text, "x@example.com", "01.01.2026");
        let second = ReportGenerator::generate(&config, text, "x@example.com", "01.01.2026");
        assert_eq!(first, second);
    }

    #[test]
    fn test_date_label() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(date_label(today, 0, None).unwrap(), "18.10.2026");
        assert_eq!(date_label(today, 14, None).unwrap(), "01.11.2026");
        assert_eq!(date_label(today, -18, None).unwrap(), "30.09.2026");
        assert_eq!(date_label(today, 3, Some("")).unwrap(), "21.10.2026");
        assert_eq!(date_label(today, 3, Some("week 42")).unwrap(), "week 42");
    }

    #[test]
    fn test_date_label_out_of_range_offset() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(date_label(today, 100_000_000, None), Err(DateOutOfRange(100_000_000)));
        assert_eq!(date_label(today, i64::MAX, None), Err(DateOutOfRange(i64::MAX)));
        assert_eq!(date_label(today, i64::MIN, None), Err(DateOutOfRange(i64::MIN)));
        // a forced label never looks at the offset
        assert_eq!(date_label(today, i64::MAX, Some("week 42")).unwrap(), "week 42");
    }
}
