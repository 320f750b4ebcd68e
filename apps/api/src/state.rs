use std::sync::Arc;

use crate::archive::ApplicationLog;
use crate::config::Config;
use crate::generation::DocumentGenerator;
use crate::progress::ProgressChannel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Single per-process queue drained by `/stream`.
    pub progress: Arc<ProgressChannel>,
    pub generator: Arc<DocumentGenerator>,
    /// `None` unless APPLICATION_LOG is set.
    pub application_log: Option<ApplicationLog>,
}
