use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

/// One row of the application spreadsheet.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationRecord {
    pub timestamp: String,
    pub job_title: String,
    pub company_name: String,
    pub hirer_name: String,
    pub directory: String,
    pub resume_pdf: String,
    pub cover_letter_pdf: String,
}

impl ApplicationRecord {
    pub fn now(
        job_title: &str,
        company_name: &str,
        hirer_name: &str,
        directory: &str,
        resume_pdf: &str,
        cover_letter_pdf: &str,
    ) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            job_title: job_title.to_string(),
            company_name: company_name.to_string(),
            hirer_name: hirer_name.to_string(),
            directory: directory.to_string(),
            resume_pdf: resume_pdf.to_string(),
            cover_letter_pdf: cover_letter_pdf.to_string(),
        }
    }
}

/// Append-only CSV log of every generated application.
#[derive(Debug, Clone)]
pub struct ApplicationLog {
    path: PathBuf,
}

impl ApplicationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record`, writing the header row first when the file is new or empty.
    pub async fn append(&self, record: ApplicationRecord) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_blocking(&path, &record))
            .await
            .context("application log writer panicked")?
    }

    /// Like [`append`](Self::append) but only logs failures; the spreadsheet is
    /// a convenience and must never fail a generation.
    pub async fn record(&self, record: ApplicationRecord) {
        match self.append(record).await {
            Ok(()) => info!("Application logged to {}", self.path.display()),
            Err(e) => warn!("Failed to append to {}: {e:#}", self.path.display()),
        }
    }
}

fn append_blocking(path: &Path, record: &ApplicationRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}
