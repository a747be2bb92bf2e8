//! Draft file management.
//!
//! The draft is a plain-text scratch file the user edits before every
//! report. Fetched issues are carried in it as comment lines, which are
//! purged and rewritten on every fetch so stale issues never pile up.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::DraftError;
use crate::tracker::IssueRef;

/// Lines starting with this never reach the report.
pub const COMMENT_PREFIX: &str = "#";

/// Lines starting with this are untracked accomplishments.
pub const OTHER_PREFIX: &str = "OTHER ";

/// Editor used when neither the config nor the environment names one.
pub const FALLBACK_EDITOR: &str = "vim";

/// The user-edited draft file.
#[derive(Debug, Clone)]
pub struct DraftFile {
    path: PathBuf,
}

impl DraftFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self) -> impl Fn(std::io::Error) -> DraftError + '_ {
        move |source| DraftError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Drop every comment line, keeping all other lines in order.
    ///
    /// Works on raw bytes, so kept lines survive whatever encoding they are
    /// in. A missing file is created empty.
    pub fn purge_comments(&self) -> Result<(), DraftError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(self.io_err()(e)),
        };

        let kept = strip_comment_lines(&content);
        std::fs::write(&self.path, &kept).map_err(self.io_err())?;

        tracing::debug!(
            path = %self.path.display(),
            removed = line_count(&content) - line_count(&kept),
            "Purged comment lines"
        );
        Ok(())
    }

    /// Append one comment line per issue.
    pub fn append_issues(&self, issues: &[IssueRef]) -> Result<(), DraftError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(self.io_err())?;

        let mut block = String::new();
        for issue in issues {
            block.push_str(&issue_comment(issue));
        }
        file.write_all(block.as_bytes()).map_err(self.io_err())?;
        file.flush().map_err(self.io_err())?;

        tracing::debug!(path = %self.path.display(), count = issues.len(), "Appended issues");
        Ok(())
    }

    /// Replace the fetched-issue comments with a fresh set.
    pub fn refresh(&self, issues: &[IssueRef]) -> Result<(), DraftError> {
        self.purge_comments()?;
        self.append_issues(issues)?;
        tracing::info!(
            path = %self.path.display(),
            issues = issues.len(),
            "Draft refreshed with open issues"
        );
        Ok(())
    }

    /// Current draft contents.
    pub fn read(&self) -> Result<String, DraftError> {
        let bytes = std::fs::read(&self.path).map_err(self.io_err())?;
        String::from_utf8(bytes).map_err(|source| DraftError::Encoding {
            path: self.path.clone(),
            source,
        })
    }

    /// Open the draft in an interactive editor and wait for it to exit.
    pub fn edit(&self, editor: &str) -> Result<(), DraftError> {
        let mut words =
            shell_words::split(editor).map_err(|source| DraftError::EditorCommand {
                command: editor.to_string(),
                source,
            })?;
        if words.is_empty() {
            return Err(DraftError::EmptyEditor);
        }
        let program = words.remove(0);

        tracing::info!(editor = %program, path = %self.path.display(), "Opening draft in editor");
        let status = Command::new(&program)
            .args(&words)
            .arg(&self.path)
            .status()
            .map_err(|source| DraftError::EditorSpawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(DraftError::EditorStatus { program, status });
        }
        Ok(())
    }
}

/// Editor command line: the configured one, then `$VISUAL`, `$EDITOR`, `vim`.
#[must_use]
pub fn resolve_editor(configured: Option<&str>) -> String {
    configured
        .map(str::to_owned)
        .or_else(|| std::env::var("VISUAL").ok())
        .or_else(|| std::env::var("EDITOR").ok())
        .filter(|cmd| !cmd.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Comment line carrying a fetched issue.
#[must_use]
pub fn issue_comment(issue: &IssueRef) -> String {
    format!("{COMMENT_PREFIX}{} {}\n", issue.id, issue.title)
}

/// Remove comment lines, keeping each kept line's own terminator. A final
/// line without a terminator gets `\n` so later appends start on a new line.
fn strip_comment_lines(content: &[u8]) -> Vec<u8> {
    let mut kept = Vec::with_capacity(content.len());
    for line in content.split_inclusive(|b| *b == b'\n') {
        if line.starts_with(COMMENT_PREFIX.as_bytes()) {
            continue;
        }
        kept.extend_from_slice(line);
        if !line.ends_with(b"\n") {
            kept.push(b'\n');
        }
    }
    kept
}

fn line_count(content: &[u8]) -> usize {
    content.split_inclusive(|b| *b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(content: Option<&str>) -> (TempDir, DraftFile) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        (dir, DraftFile::new(path))
    }

    #[test]
    fn test_strip_keeps_order_and_terminators() {
        let content = b"PROJ-1 Done\r\n#PROJ-2 stale\nnote\n#PROJ-3 stale\nOTHER x";
        assert_eq!(
            strip_comment_lines(content),
            b"PROJ-1 Done\r\nnote\nOTHER x\n"
        );
    }

    #[test]
    fn test_strip_empty() {
        assert!(strip_comment_lines(b"").is_empty());
    }

    #[test]
    fn test_refresh_keeps_non_utf8_lines() {
        let (_dir, draft) = setup(None);
        std::fs::write(draft.path(), b"caf\xe9 notes\n#PROJ-1 old\n\xff\xfe raw").unwrap();

        draft.refresh(&[IssueRef::new("PROJ-2", "New work")]).unwrap();
        assert_eq!(
            std::fs::read(draft.path()).unwrap(),
            b"caf\xe9 notes\n\xff\xfe raw\n#PROJ-2 New work\n"
        );
        assert!(matches!(draft.read(), Err(DraftError::Encoding { .. })));
    }

    #[test]
    fn test_purge_creates_missing_file() {
        let (_dir, draft) = setup(None);
        draft.purge_comments().unwrap();
        assert_eq!(draft.read().unwrap(), "");
    }

    #[test]
    fn test_append_format() {
        let (_dir, draft) = setup(Some("PROJ-1 Done\n"));
        draft
            .append_issues(&[IssueRef::new("PROJ-7", "Fix login bug")])
            .unwrap();
        assert_eq!(draft.read().unwrap(), "PROJ-1 Done\n#PROJ-7 Fix login bug\n");
    }

    #[test]
    fn test_refresh_replaces_stale_comments() {
        let (_dir, draft) = setup(Some("PROJ-1 Done\n#PROJ-9 stale ticket\nreviewed PRs\n"));
        draft.refresh(&[IssueRef::new("PROJ-2", "New work")]).unwrap();
        assert_eq!(
            draft.read().unwrap(),
            "PROJ-1 Done\nreviewed PRs\n#PROJ-2 New work\n"
        );
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let (_dir, draft) = setup(Some("OTHER onboarding\n#OLD-1 gone\n"));
        let issues = [IssueRef::new("A1", "Title A"), IssueRef::new("B2", "Title B")];

        draft.refresh(&issues).unwrap();
        let first = draft.read().unwrap();
        draft.refresh(&issues).unwrap();
        assert_eq!(draft.read().unwrap(), first);
        assert_eq!(first, "OTHER onboarding\n#A1 Title A\n#B2 Title B\n");
    }

    #[test]
    fn test_resolve_editor_prefers_config() {
        assert_eq!(resolve_editor(Some("code --wait")), "code --wait");
    }

    #[test]
    fn test_empty_editor_rejected() {
        let (_dir, draft) = setup(Some(""));
        assert!(matches!(draft.edit("   "), Err(DraftError::EmptyEditor)));
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_runs_command_with_path() {
        let (_dir, draft) = setup(Some("before\n"));
        // `sh -c '<script>' sh <path>`: the draft path arrives as $1
        draft
            .edit("sh -c 'echo edited >> \"$1\"' sh")
            .unwrap();
        assert_eq!(draft.read().unwrap(), "before\nedited\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_failure_status() {
        let (_dir, draft) = setup(Some(""));
        assert!(matches!(
            draft.edit("false"),
            Err(DraftError::EditorStatus { .. })
        ));
    }

    #[test]
    fn test_edit_missing_program() {
        let (_dir, draft) = setup(Some(""));
        assert!(matches!(
            draft.edit("definitely-not-an-editor-binary"),
            Err(DraftError::EditorSpawn { .. })
        ));
    }
}
