//! Document generation — orchestrates the full pipeline for one submission.
//!
//! Flow: load templates → resume prompt → LLM → cover letter prompt → LLM →
//!       create run dir → inline CSS → write HTML → render both PDFs.
//!
//! Progress strings are pushed into the [`ProgressChannel`] at every phase
//! boundary so the browser can follow along.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use tracing::info;

use crate::archive::{Archive, RunDir};
use crate::errors::AppError;
use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, GENERIC_HIRING_MANAGER, LETTER_EXPERIENCE_HEADING,
    RESUME_EXPERIENCE_HEADING, RESUME_PROMPT_TEMPLATE,
};
use crate::intake::JobDetails;
use crate::llm_client::prompts::{optional_section, RAW_HTML_ONLY};
use crate::llm_client::{ContentModel, LlmError};
use crate::progress::ProgressChannel;
use crate::render::{prepare_html, PdfRenderer};

const RESUME_FILE: &str = "resume.html";
const LETTER_FILE: &str = "letter.html";
const STYLESHEET_FILE: &str = "style.css";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// The base resume, letter skeleton and stylesheet read from the resume directory.
#[derive(Debug, Clone)]
pub struct Templates {
    pub resume: String,
    pub letter: String,
    pub stylesheet: String,
}

/// Raw HTML returned by the model, before CSS inlining.
#[derive(Debug, Clone)]
pub struct GeneratedDocuments {
    pub resume_html: String,
    pub cover_letter_html: String,
}

pub struct DocumentGenerator {
    model: Arc<dyn ContentModel>,
    renderer: Arc<dyn PdfRenderer>,
    archive: Archive,
    resume_dir: PathBuf,
}

impl DocumentGenerator {
    pub fn new(
        model: Arc<dyn ContentModel>,
        renderer: Arc<dyn PdfRenderer>,
        archive: Archive,
        resume_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model,
            renderer,
            archive,
            resume_dir: resume_dir.into(),
        }
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Reads the templates fresh on every run so edits apply without a restart.
    pub async fn load_templates(&self) -> Result<Templates, AppError> {
        let read = |name: &'static str| {
            let path = self.resume_dir.join(name);
            async move {
                tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read template {}", path.display()))
            }
        };

        Ok(Templates {
            resume: read(RESUME_FILE).await?,
            letter: read(LETTER_FILE).await?,
            stylesheet: read(STYLESHEET_FILE).await?,
        })
    }

    /// Asks the model for the tailored resume, then the cover letter.
    pub async fn generate_documents(
        &self,
        details: &JobDetails,
        templates: &Templates,
        progress: &ProgressChannel,
    ) -> Result<GeneratedDocuments, AppError> {
        info!(
            "Generating customized resume for {} at {}",
            details.job_title, details.company_name
        );
        progress.info("Generating resume...");
        let resume_prompt = build_resume_prompt(&templates.resume, details);
        let resume_html = self.model.generate(&resume_prompt).await?;
        ensure_html_document(&resume_html)?;

        info!("Generating cover letter for {}", details.company_name);
        progress.info("Generating cover letter...");
        let date = Local::now().format("%B %d, %Y").to_string();
        let letter_prompt =
            build_cover_letter_prompt(&templates.resume, &templates.letter, details, &date);
        let cover_letter_html = self.model.generate(&letter_prompt).await?;
        ensure_html_document(&cover_letter_html)?;

        info!("Documents generated successfully");
        Ok(GeneratedDocuments {
            resume_html,
            cover_letter_html,
        })
    }

    /// Writes both documents with inlined CSS into a new run directory and
    /// renders each to PDF.
    pub async fn generate_pdfs(
        &self,
        documents: &GeneratedDocuments,
        stylesheet: &str,
        job_title: &str,
    ) -> Result<RunDir, AppError> {
        info!("Starting PDF generation...");
        let run = self.archive.create_run(job_title).await?;

        tokio::fs::write(
            &run.resume_html,
            prepare_html(&documents.resume_html, stylesheet),
        )
        .await?;
        tokio::fs::write(
            &run.cover_letter_html,
            prepare_html(&documents.cover_letter_html, stylesheet),
        )
        .await?;
        info!("HTML files prepared with embedded CSS");

        self.renderer
            .render(&run.resume_html, &run.resume_pdf)
            .await?;
        self.renderer
            .render(&run.cover_letter_html, &run.cover_letter_pdf)
            .await?;

        info!("PDF generation completed in {}", run.path.display());
        Ok(run)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt building
// ────────────────────────────────────────────────────────────────────────────

pub fn build_resume_prompt(resume_content: &str, details: &JobDetails) -> String {
    RESUME_PROMPT_TEMPLATE
        .replace(
            "{additional_context}",
            &optional_section(RESUME_EXPERIENCE_HEADING, &details.relevant_experience),
        )
        .replace("{output_contract}", RAW_HTML_ONLY)
        .replace("{job_description}", &details.job_description)
        .replace("{company_overview}", &details.company_overview)
        // Last, so markup in the resume is never scanned for placeholders.
        .replace("{resume_content}", resume_content)
}

pub fn build_cover_letter_prompt(
    resume_content: &str,
    letter_template: &str,
    details: &JobDetails,
    date: &str,
) -> String {
    let hiring_manager = if details.hirer_name.is_empty() {
        GENERIC_HIRING_MANAGER.to_string()
    } else {
        format!(
            "{} {}",
            details.hirer_gender.salutation(),
            details.hirer_name
        )
    };

    COVER_LETTER_PROMPT_TEMPLATE
        .replace(
            "{additional_context}",
            &optional_section(LETTER_EXPERIENCE_HEADING, &details.relevant_experience),
        )
        .replace("{output_contract}", RAW_HTML_ONLY)
        .replace("{job_title}", &details.job_title)
        .replace("{company_name}", &details.company_name)
        .replace("{hiring_manager}", &hiring_manager)
        .replace("{date}", date)
        .replace("{job_description}", &details.job_description)
        .replace("{company_overview}", &details.company_overview)
        .replace("{letter_template}", letter_template)
        .replace("{resume_content}", resume_content)
}

fn ensure_html_document(text: &str) -> Result<(), LlmError> {
    if text.to_ascii_lowercase().contains("<html") {
        Ok(())
    } else {
        Err(LlmError::InvalidDocument)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::intake::validation::HirerGender;
    use crate::render::RenderError;

    /// Returns canned answers in order and records every prompt it saw.
    pub(crate) struct ScriptedModel {
        answers: Mutex<Vec<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(answers: Vec<Result<String, LlmError>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn html(resume: &str, letter: &str) -> Self {
            Self::new(vec![
                Ok(format!("<!DOCTYPE html><html><head></head><body>{resume}</body></html>")),
                Ok(format!("<!DOCTYPE html><html><head></head><body>{letter}</body></html>")),
            ])
        }
    }

    #[async_trait]
    impl ContentModel for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            answers.remove(0)
        }
    }

    /// Copies the HTML bytes to the PDF path so tests can inspect what was rendered.
    pub(crate) struct CopyRenderer;

    #[async_trait]
    impl PdfRenderer for CopyRenderer {
        async fn render(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError> {
            tokio::fs::copy(html_path, pdf_path)
                .await
                .map_err(|_| RenderError::MissingOutput(pdf_path.to_path_buf()))?;
            Ok(())
        }
    }

    pub(crate) async fn write_templates(dir: &Path) {
        tokio::fs::create_dir_all(dir).await.unwrap();
        tokio::fs::write(
            dir.join(RESUME_FILE),
            r#"<!DOCTYPE html><html><head><link rel="stylesheet" href="/resume/style.css"></head><body><h1>Jane Doe</h1></body></html>"#,
        )
        .await
        .unwrap();
        tokio::fs::write(
            dir.join(LETTER_FILE),
            r#"<!DOCTYPE html><html><head></head><body><p>[DATE]</p><p>[RECIPIENT]</p><div class="letter-body"></div></body></html>"#,
        )
        .await
        .unwrap();
        tokio::fs::write(dir.join(STYLESHEET_FILE), "h1 { color: navy; }")
            .await
            .unwrap();
    }

    pub(crate) fn details() -> JobDetails {
        JobDetails {
            job_title: "Platform Engineer".to_string(),
            company_name: "Oxide".to_string(),
            hirer_name: "Sam Lee".to_string(),
            hirer_gender: HirerGender::Male,
            job_description: "Operate the rack-scale control plane.".to_string(),
            company_overview: "We build cloud computers.".to_string(),
            relevant_experience: String::new(),
        }
    }

    #[test]
    fn test_resume_prompt_contents() {
        let prompt = build_resume_prompt("<h1>Jane</h1>", &details());
        assert!(prompt.contains("<h1>Jane</h1>"));
        assert!(prompt.contains("Operate the rack-scale control plane."));
        assert!(prompt.contains("We build cloud computers."));
        assert!(prompt.contains("Start directly with <!DOCTYPE html>"));
        assert!(!prompt.contains(RESUME_EXPERIENCE_HEADING));
        assert!(!prompt.contains('{'), "unfilled placeholder in: {prompt}");
    }

    #[test]
    fn test_resume_prompt_with_experience() {
        let details = JobDetails {
            relevant_experience: "Ran Kubernetes in prod".to_string(),
            ..details()
        };
        let prompt = build_resume_prompt("", &details);
        assert!(prompt.contains("Additional Relevant Experience:\nRan Kubernetes in prod"));
    }

    #[test]
    fn test_resume_content_is_not_rescanned() {
        let prompt = build_resume_prompt("<style>a {job_description}</style>", &details());
        assert!(prompt.contains("a {job_description}"));
    }

    #[test]
    fn test_cover_letter_prompt_salutation_and_date() {
        let prompt = build_cover_letter_prompt("", "<div>[DATE]</div>", &details(), "March 04, 2025");
        assert!(prompt.contains("- Hiring Manager: Mr. Sam Lee"));
        assert!(prompt.contains("- Date: March 04, 2025"));
        assert!(prompt.contains("- Company: Oxide"));
        assert!(prompt.contains("<div>[DATE]</div>"));
    }

    #[test]
    fn test_cover_letter_prompt_without_hirer_name() {
        let details = JobDetails {
            hirer_name: String::new(),
            hirer_gender: HirerGender::Unknown,
            ..details()
        };
        let prompt = build_cover_letter_prompt("", "", &details, "today");
        assert!(prompt.contains(GENERIC_HIRING_MANAGER));
        assert!(!prompt.contains("Ms."));
    }

    #[test]
    fn test_ensure_html_document() {
        assert!(ensure_html_document("<!DOCTYPE html><HTML></HTML>").is_ok());
        assert!(matches!(
            ensure_html_document("Sorry, I cannot help with that."),
            Err(LlmError::InvalidDocument)
        ));
    }

    #[tokio::test]
    async fn test_full_pipeline_writes_archive() {
        let tmp = TempDir::new().unwrap();
        write_templates(&tmp.path().join("resume")).await;
        let model = Arc::new(ScriptedModel::html("tailored resume", "dear sam"));
        let generator = DocumentGenerator::new(
            model.clone(),
            Arc::new(CopyRenderer),
            Archive::new(tmp.path().join("resume_gen")),
            tmp.path().join("resume"),
        );
        let progress = ProgressChannel::new(10);

        let templates = generator.load_templates().await.unwrap();
        let documents = generator
            .generate_documents(&details(), &templates, &progress)
            .await
            .unwrap();
        let run = generator
            .generate_pdfs(&documents, &templates.stylesheet, "Platform Engineer")
            .await
            .unwrap();

        let prompts = model.prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("<h1>Jane Doe</h1>"));
        assert!(prompts[1].contains("letter-body"));

        let resume_pdf = tokio::fs::read_to_string(&run.resume_pdf).await.unwrap();
        assert!(resume_pdf.contains("tailored resume"));
        assert!(resume_pdf.contains("h1 { color: navy; }"));
        let letter_html = tokio::fs::read_to_string(&run.cover_letter_html)
            .await
            .unwrap();
        assert!(letter_html.contains("dear sam"));
        assert!(run.name().ends_with("_Platform_Engineer"));

        assert_eq!(progress.try_recv().unwrap().message, "Generating resume...");
        assert_eq!(
            progress.try_recv().unwrap().message,
            "Generating cover letter..."
        );
    }

    #[tokio::test]
    async fn test_non_html_answer_stops_before_cover_letter() {
        let tmp = TempDir::new().unwrap();
        write_templates(tmp.path()).await;
        let model = Arc::new(ScriptedModel::new(vec![Ok("I can't do that".to_string())]));
        let generator = DocumentGenerator::new(
            model.clone(),
            Arc::new(CopyRenderer),
            Archive::new(tmp.path().join("out")),
            tmp.path(),
        );
        let templates = generator.load_templates().await.unwrap();

        let err = generator
            .generate_documents(&details(), &templates, &ProgressChannel::new(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::InvalidDocument)));
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_templates() {
        let tmp = TempDir::new().unwrap();
        let generator = DocumentGenerator::new(
            Arc::new(ScriptedModel::new(vec![])),
            Arc::new(CopyRenderer),
            Archive::new(tmp.path().join("out")),
            tmp.path().join("nowhere"),
        );
        let err = generator.load_templates().await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(err.to_string().contains("resume.html"));
    }
}
