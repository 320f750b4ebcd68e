use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::archive::file_name;
use crate::errors::AppError;
use crate::state::AppState;

fn content_type(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "pdf" => "application/pdf",
        Some(ext) if ext == "html" => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// GET /download/*path
///
/// Sends an archived file as an attachment. `path` is relative to the archive
/// root, e.g. `20250203_140509_Data_Engineer/Resume_Data_Engineer.pdf`.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let resolved = state
        .generator
        .archive()
        .resolve(&path)
        .await
        .ok_or_else(|| {
            error!("Invalid or missing download path: {path}");
            AppError::NotFound(format!("File {path} not found"))
        })?;

    let bytes = tokio::fs::read(&resolved)
        .await
        .map_err(|source| AppError::Download {
            path: path.clone(),
            source,
        })?;
    let download_name = file_name(&resolved);

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&download_name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
