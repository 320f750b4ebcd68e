pub mod files;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, get_service},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::generation::handlers::handle_generate;
use crate::progress::stream::handle_stream;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;
    let index = ServeFile::new(config.static_dir.join("index.html"));
    let favicon = ServeFile::new(config.static_dir.join("favicon.png"));

    Router::new()
        .route("/health", get(health::health_handler))
        // Browser client + form submission
        .route("/", get_service(index).post(handle_generate))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .route_service("/favicon.ico", favicon)
        // Progress channel
        .route("/stream", get(handle_stream))
        // Templates and archived output
        .route("/download/*path", get(files::handle_download))
        .nest_service("/resume", ServeDir::new(&config.resume_dir))
        .nest_service("/resume_gen", ServeDir::new(&config.output_dir))
        .layer(DefaultBodyLimit::max(config.max_content_length))
        .with_state(state)
}
