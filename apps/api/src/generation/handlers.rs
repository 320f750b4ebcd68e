//! Axum route handler for the generation form.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    Form, Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::archive::{file_name, ApplicationRecord};
use crate::errors::AppError;
use crate::intake::{JobDetails, JobDetailsForm};
use crate::progress::ProgressChannel;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

/// File names are relative to `directory`, itself relative to the archive root.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub resume_pdf: String,
    pub cover_letter_pdf: String,
    pub directory: String,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /
///
/// Validates the job form, generates the resume and cover letter, renders
/// both to PDF and returns where to download them. Progress is pushed to
/// `/stream` throughout; failures end with an `error` update.
pub async fn handle_generate(
    State(state): State<AppState>,
    form: Result<Form<JobDetailsForm>, FormRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    info!("Form submission received");
    // A new run must never replay the previous run's messages.
    let stale = state.progress.clear();
    if stale > 0 {
        info!("Discarded {stale} undelivered progress updates from a previous run");
    }
    state
        .progress
        .info("Form submission received, starting processing...");

    let result = match parse_form(form) {
        Ok(details) => run_generation(&state, &details).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        report_failure(&state.progress, e);
    }
    result.map(Json)
}

fn parse_form(form: Result<Form<JobDetailsForm>, FormRejection>) -> Result<JobDetails, AppError> {
    let Form(form) = form.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::validation(vec![rejection.body_text()])
        }
    })?;

    form.validate().map_err(|details| {
        error!("Form validation failed: {}", details.join("; "));
        AppError::validation(details)
    })
}

async fn run_generation(
    state: &AppState,
    details: &JobDetails,
) -> Result<GenerateResponse, AppError> {
    info!(
        "Form data received: {} at {}",
        details.job_title, details.company_name
    );
    let progress = state.progress.as_ref();
    let generator = state.generator.as_ref();

    progress.info("Sending data to AI for processing...");
    let templates = generator.load_templates().await?;
    let documents = generator
        .generate_documents(details, &templates, progress)
        .await?;
    progress.info("AI response received");

    progress.info("Generating PDF files...");
    let run = generator
        .generate_pdfs(&documents, &templates.stylesheet, &details.job_title)
        .await?;
    progress.success("PDF files generated successfully!");

    let response = GenerateResponse {
        resume_pdf: file_name(&run.resume_pdf),
        cover_letter_pdf: file_name(&run.cover_letter_pdf),
        directory: run.name(),
        message: "Documents ready for download".to_string(),
    };

    if let Some(log) = &state.application_log {
        log.record(ApplicationRecord::now(
            &details.job_title,
            &details.company_name,
            &details.hirer_name,
            &response.directory,
            &response.resume_pdf,
            &response.cover_letter_pdf,
        ))
        .await;
    }

    Ok(response)
}

fn report_failure(progress: &ProgressChannel, e: &AppError) {
    match e {
        AppError::Validation { message, .. } => progress.error(message.clone()),
        other => {
            error!("Document generation error: {other}");
            progress.error(format!("Error: {}", other.user_message()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::validation::tests::valid_form;

    #[test]
    fn test_report_failure_for_validation() {
        let progress = ProgressChannel::new(5);
        report_failure(&progress, &AppError::validation(vec!["x: y".to_string()]));
        let update = progress.try_recv().unwrap();
        assert_eq!(update.message, "Form validation failed. Please check your inputs.");
        assert_eq!(update.category, crate::progress::Category::Error);
    }

    #[test]
    fn test_report_failure_prefixes_error() {
        let progress = ProgressChannel::new(5);
        report_failure(
            &progress,
            &AppError::Llm(crate::llm_client::LlmError::EmptyContent),
        );
        assert!(progress
            .try_recv()
            .unwrap()
            .message
            .starts_with("Error: AI generation failed"));
    }

    #[test]
    fn test_parse_form_ok() {
        let details = parse_form(Ok(Form(valid_form()))).unwrap();
        assert_eq!(details.company_name, "Ferrous Systems");
    }
}
