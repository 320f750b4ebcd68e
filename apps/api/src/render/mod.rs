//! HTML preparation and PDF rasterization.
//!
//! Generated documents reference the shared stylesheet with a `<link>`; before
//! archiving, the stylesheet is inlined so each HTML file is self-contained and
//! prints the same way in the headless browser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

/// The link tag the templates use for the shared stylesheet.
const STYLESHEET_LINK: &str = r#"<link rel="stylesheet" href="/resume/style.css">"#;

/// A4, no margins, backgrounds printed.
const PRINT_CSS: &str = "@page { size: A4; margin: 0; } \
html, body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }";

/// Upper bound on how long the browser may take for a single document.
const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error("browser exited with {status}: {stderr}")]
    Browser { status: String, stderr: String },

    #[error("timed out after {:?} rendering {}", .0, .1.display())]
    Timeout(Duration, PathBuf),

    #[error("no PDF produced at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("cannot express {} as a file URL", .0.display())]
    FileUrl(PathBuf),
}

/// Inlines `css` into `html`: drops the stylesheet link and inserts a
/// `<style>` block (print rules first) before `</head>`.
pub fn prepare_html(html: &str, css: &str) -> String {
    let html = html.replace(STYLESHEET_LINK, "");
    let style = format!("<style>{PRINT_CSS}\n{css}</style>");
    match find_ascii_case_insensitive(&html, "</head>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + style.len());
            out.push_str(&html[..idx]);
            out.push_str(&style);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{style}{html}"),
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Percent-encoded `file://` URL for an absolute path.
fn file_url(path: &Path) -> Result<String, RenderError> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| RenderError::FileUrl(path.to_path_buf()))
}

/// Turns an HTML file on disk into a PDF file on disk.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError>;
}

/// Renders with a headless Chromium/Chrome binary via `--print-to-pdf`.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    program: String,
}

impl ChromiumRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(html_url: &str, pdf_path: &Path) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-pdf-header-footer".to_string(),
            "--hide-scrollbars".to_string(),
            "--window-size=1920,1080".to_string(),
            // Lets web fonts and images settle before printing.
            "--virtual-time-budget=5000".to_string(),
            format!("--print-to-pdf={}", pdf_path.display()),
            html_url.to_string(),
        ]
    }
}

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError> {
        let html_path = std::path::absolute(html_path).map_err(|source| RenderError::Launch {
            program: self.program.clone(),
            source,
        })?;
        let pdf_path = std::path::absolute(pdf_path).map_err(|source| RenderError::Launch {
            program: self.program.clone(),
            source,
        })?;
        let url = file_url(&html_path)?;
        debug!("Rendering {} -> {}", url, pdf_path.display());

        let mut command = Command::new(&self.program);
        command
            .args(Self::args(&url, &pdf_path))
            .kill_on_drop(true);
        let output = tokio::time::timeout(RENDER_TIMEOUT, command.output())
            .await
            .map_err(|_| RenderError::Timeout(RENDER_TIMEOUT, html_path.clone()))?
            .map_err(|source| RenderError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Browser {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        ensure_pdf(&pdf_path).await?;
        info!("Rendered {}", pdf_path.display());
        Ok(())
    }
}

/// Browsers sometimes exit 0 without writing output; treat that as a failure.
pub async fn ensure_pdf(pdf_path: &Path) -> Result<(), RenderError> {
    match tokio::fs::metadata(pdf_path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(RenderError::MissingOutput(pdf_path.to_path_buf())),
    }
}
