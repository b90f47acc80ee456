//! SecureLife Contact API Library
//!
//! Backend for the SecureLife Fincorp marketing site. Every lead form posts
//! to one route; each submission is mailed to the operator, acknowledged to
//! the submitter and appended to the leads spreadsheet.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `dispatcher`: Concurrent fan-out to mail and spreadsheet.
//! - `errors`: Error handling types.
//! - `geolocation`: Visitor IP geolocation with a single-flight cache.
//! - `handlers`: HTTP request handlers and shared state.
//! - `intake`: Validation and rendering of submissions.
//! - `mailer`: SMTP mail transport.
//! - `models`: Request, response and outbound payload types.
//! - `openapi`: OpenAPI document.
//! - `sheets_client`: Spreadsheet webhook client.
//! - `templates`: HTML email templates.

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod geolocation;
pub mod handlers;
pub mod intake;
pub mod mailer;
pub mod models;
pub mod openapi;
pub mod sheets_client;
pub mod templates;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::AppState;

/// Largest accepted request body. Lead payloads are a few hundred bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the full HTTP application around `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/contact", post(handlers::submit_contact))
        .route("/api/geo", get(handlers::locate_visitor))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
