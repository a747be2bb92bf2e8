//! Preview mode: render the report in a browser instead of mailing it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::PreviewError;

/// Write the report to a temporary HTML file that outlives the run.
pub fn write_preview(report: &str) -> Result<PathBuf, PreviewError> {
    let mut file = tempfile::Builder::new()
        .prefix("status-report-")
        .suffix(".html")
        .tempfile()?;
    write!(file, "<html>{report}</html>")?;
    file.flush()?;

    let (_, path) = file.keep().map_err(|e| PreviewError::Io(e.error))?;
    tracing::debug!(path = %path.display(), "Wrote preview file");
    Ok(path)
}

/// Open `path` with the given browser command, or the system browser.
pub fn open_in_browser(path: &Path, browser: Option<&str>) -> Result<(), PreviewError> {
    let Some(command) = browser else {
        tracing::info!(path = %path.display(), "Opening preview in system browser");
        return webbrowser::open(&path.to_string_lossy()).map_err(|source| {
            PreviewError::Launch {
                path: path.to_path_buf(),
                source,
            }
        });
    };

    let mut words = shell_words::split(command).map_err(|source| PreviewError::BrowserCommand {
        command: command.to_string(),
        source,
    })?;
    if words.is_empty() {
        return Err(PreviewError::EmptyBrowser);
    }
    let program = words.remove(0);

    tracing::info!(browser = %program, path = %path.display(), "Opening preview");
    let status = Command::new(&program)
        .args(&words)
        .arg(path)
        .status()
        .map_err(|source| PreviewError::Launch {
            path: path.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(PreviewError::BrowserStatus { program, status });
    }
    Ok(())
}

/// Write the preview file and open it.
pub fn preview(report: &str, browser: Option<&str>) -> Result<PathBuf, PreviewError> {
    let path = write_preview(report)?;
    open_in_browser(&path, browser)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_file_is_wrapped_and_kept() {
        let path = write_preview("<ul></ul>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html><ul></ul></html>");
        assert!(path.extension().is_some_and(|ext| ext == "html"));
        std::fs::remove_file(path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_custom_browser_receives_path() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("opened");
        let path = write_preview("x").unwrap();

        let command = format!("sh -c 'cp \"$1\" {}' sh", marker.display());
        open_in_browser(&path, Some(&command)).unwrap();
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "<html>x</html>");
        std::fs::remove_file(path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_browser_failure_is_error() {
        let path = write_preview("x").unwrap();
        assert!(matches!(
            open_in_browser(&path, Some("false")),
            Err(PreviewError::BrowserStatus { .. })
        ));
        std::fs::remove_file(path).unwrap();
    }
}
