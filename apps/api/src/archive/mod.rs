//! Archive of generated documents.
//!
//! Every generation run gets its own directory under the archive root, named
//! `<YYYYmmdd_HHMMSS>_<safe job title>`, holding the HTML and PDF pair for the
//! resume and the cover letter.

pub mod log;

use std::path::{Component, Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::info;

pub use log::{ApplicationLog, ApplicationRecord};

/// Reduces a job title to a filesystem-safe fragment: keeps alphanumerics,
/// `_`, `-` and whitespace, trims, then turns each whitespace char (tabs and
/// newlines included) into an underscore.
pub fn safe_title(job_title: &str) -> String {
    job_title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Root directory holding one subdirectory per generation run.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

/// Output locations for a single generation run.
#[derive(Debug, Clone)]
pub struct RunDir {
    pub path: PathBuf,
    pub resume_html: PathBuf,
    pub resume_pdf: PathBuf,
    pub cover_letter_html: PathBuf,
    pub cover_letter_pdf: PathBuf,
}

impl Archive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the run directory for `job_title`, stamped with the current local time.
    pub async fn create_run(&self, job_title: &str) -> std::io::Result<RunDir> {
        self.create_run_at(job_title, Local::now().naive_local())
            .await
    }

    pub async fn create_run_at(
        &self,
        job_title: &str,
        at: NaiveDateTime,
    ) -> std::io::Result<RunDir> {
        let safe = safe_title(job_title);
        let dir_name = format!("{}_{}", at.format("%Y%m%d_%H%M%S"), safe);
        let path = self.root.join(dir_name);
        tokio::fs::create_dir_all(&path).await?;
        info!("Created output directory {}", path.display());

        Ok(RunDir {
            resume_html: path.join(format!("Resume_{safe}.html")),
            resume_pdf: path.join(format!("Resume_{safe}.pdf")),
            cover_letter_html: path.join(format!("Cover_Letter_{safe}.html")),
            cover_letter_pdf: path.join(format!("Cover_Letter_{safe}.pdf")),
            path,
        })
    }

    /// Resolves a client-supplied path relative to the archive root.
    ///
    /// Returns `None` for absolute paths, any `..`/root/prefix component, or
    /// anything that is not an existing regular file inside the root.
    pub async fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let mut candidate = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => candidate.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if candidate == self.root {
            return None;
        }

        // Symlinks must not lead outside the archive either.
        let root = tokio::fs::canonicalize(&self.root).await.ok()?;
        let resolved = tokio::fs::canonicalize(&candidate).await.ok()?;
        if !resolved.starts_with(&root) {
            return None;
        }
        let metadata = tokio::fs::metadata(&resolved).await.ok()?;
        metadata.is_file().then_some(resolved)
    }
}

impl RunDir {
    /// Name of the run directory, as used in download links.
    pub fn name(&self) -> String {
        file_name(&self.path)
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
