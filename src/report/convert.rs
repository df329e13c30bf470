//! HTML to PDF conversion backend
//!
//! Wraps headless Chrome behind an explicit two-tier resolution policy: a
//! configured executable path is tried first, then the browser's own default
//! discovery. Only resolution is retried; a backend that was located but
//! failed mid-conversion is terminal for that request.

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    /// Neither the configured path nor default discovery produced a working
    /// backend. Recoverable: surface an "export backend missing" message.
    #[error("conversion backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend located but the conversion itself failed. Not retried.
    #[error("document conversion failed: {0}")]
    Conversion(String),

    #[error("chart rasterization failed: {0}")]
    Raster(String),

    #[error("failed to write report output: {0}")]
    Io(#[from] std::io::Error),
}

/// Staging files get unique names so overlapping exports cannot clobber
/// each other.
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Per-process unique tag for staging-file names.
pub(crate) fn staging_tag() -> String {
    format!(
        "{}_{}",
        std::process::id(),
        STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

/// HTML-to-PDF converter with a bounded conversion time.
#[derive(Debug, Clone)]
pub struct Converter {
    browser_path: Option<PathBuf>,
    timeout: Duration,
}

impl Converter {
    pub fn new(browser_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            browser_path,
            timeout,
        }
    }

    /// Backend resolution order: the configured executable first, then the
    /// backend's default discovery (`None` lets the launcher search the
    /// system itself).
    fn launch_candidates(&self) -> Vec<Option<PathBuf>> {
        match &self.browser_path {
            Some(path) => vec![Some(path.clone()), None],
            None => vec![None],
        }
    }

    /// Convert a standalone HTML document to PDF bytes.
    ///
    /// The whole conversion is capped by the configured timeout; expiry is
    /// reported as `BackendUnavailable` since a backend that never answers is
    /// indistinguishable from a missing one.
    pub async fn html_to_pdf(&self, html: String) -> Result<Vec<u8>, ExportError> {
        let candidates = self.launch_candidates();
        let browser_timeout = self.timeout;

        let task =
            tokio::task::spawn_blocking(move || convert_blocking(&candidates, &html, browser_timeout));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined
                .map_err(|e| ExportError::Conversion(format!("conversion task failed: {e}")))?,
            Err(_) => Err(ExportError::BackendUnavailable(format!(
                "conversion did not finish within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn convert_blocking(
    candidates: &[Option<PathBuf>],
    html: &str,
    browser_timeout: Duration,
) -> Result<Vec<u8>, ExportError> {
    let browser = launch_browser(candidates, browser_timeout)?;

    // Chrome caps navigable data: URL length, so the document goes through a
    // staging file instead of being inlined.
    let staging = std::env::temp_dir().join(format!("classprofile_{}.html", staging_tag()));
    std::fs::write(&staging, html)?;

    let result = print_document(&browser, &staging);

    if let Err(e) = std::fs::remove_file(&staging) {
        warn!("Failed to remove staging file {:?}: {}", staging, e);
    }

    result
}

fn print_document(browser: &Browser, staging: &std::path::Path) -> Result<Vec<u8>, ExportError> {
    let tab = browser
        .new_tab()
        .map_err(|e| ExportError::Conversion(format!("failed to open tab: {e}")))?;

    let url = format!("file://{}", staging.display());
    tab.navigate_to(&url)
        .map_err(|e| ExportError::Conversion(format!("failed to load document: {e}")))?;
    tab.wait_until_navigated()
        .map_err(|e| ExportError::Conversion(format!("document never finished loading: {e}")))?;

    tab.print_to_pdf(Some(pdf_options()))
        .map_err(|e| ExportError::Conversion(format!("printing failed: {e}")))
}

/// Try each launch candidate in order; all failing means the backend is
/// unavailable, carrying the last launcher error for the log.
fn launch_browser(
    candidates: &[Option<PathBuf>],
    browser_timeout: Duration,
) -> Result<Browser, ExportError> {
    let mut last_error = String::from("no launch candidates");

    for candidate in candidates {
        let options = LaunchOptions {
            headless: true,
            sandbox: false,
            path: candidate.clone(),
            idle_browser_timeout: browser_timeout,
            ..Default::default()
        };

        match Browser::new(options) {
            Ok(browser) => {
                match candidate {
                    Some(path) => info!("Conversion backend launched from {:?}", path),
                    None => info!("Conversion backend launched via default discovery"),
                }
                return Ok(browser);
            }
            Err(e) => {
                warn!(
                    "Conversion backend launch failed ({}): {}",
                    candidate
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "default discovery".to_string()),
                    e
                );
                last_error = e.to_string();
            }
        }
    }

    Err(ExportError::BackendUnavailable(last_error))
}

fn pdf_options() -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        prefer_css_page_size: Some(true),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_is_tried_before_discovery() {
        let converter = Converter::new(
            Some(PathBuf::from("/opt/chromium/chrome")),
            Duration::from_secs(30),
        );

        assert_eq!(
            converter.launch_candidates(),
            vec![Some(PathBuf::from("/opt/chromium/chrome")), None]
        );
    }

    #[test]
    fn test_unconfigured_backend_uses_discovery_only() {
        let converter = Converter::new(None, Duration::from_secs(30));

        assert_eq!(converter.launch_candidates(), vec![None]);
    }

    #[test]
    fn test_exhausted_candidates_degrade_to_unavailable() {
        // Only explicit bogus paths, no default-discovery entry, so the
        // outcome is the same whether or not Chrome is installed. Nothing is
        // written on this path either: the renderer persists output only
        // after html_to_pdf returns bytes.
        let candidates = vec![
            Some(PathBuf::from("/nonexistent/primary/chrome")),
            Some(PathBuf::from("/nonexistent/secondary/chrome")),
        ];

        let result = launch_browser(&candidates, Duration::from_secs(1));
        assert!(matches!(result, Err(ExportError::BackendUnavailable(_))));
    }

    #[test]
    fn test_staging_tags_are_unique() {
        assert_ne!(staging_tag(), staging_tag());
    }

    #[test]
    fn test_error_variants_are_distinguishable() {
        let unavailable = ExportError::BackendUnavailable("not found".to_string());
        let conversion = ExportError::Conversion("tab crashed".to_string());

        assert_eq!(
            unavailable.to_string(),
            "conversion backend unavailable: not found"
        );
        assert_eq!(conversion.to_string(), "document conversion failed: tab crashed");
        assert!(matches!(unavailable, ExportError::BackendUnavailable(_)));
        assert!(matches!(conversion, ExportError::Conversion(_)));
    }

    #[test]
    fn test_pdf_options_keep_backgrounds() {
        let options = pdf_options();
        assert_eq!(options.print_background, Some(true));
    }
}
