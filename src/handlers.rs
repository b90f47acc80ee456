use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::dispatcher;
use crate::errors::AppError;
use crate::geolocation::{self, GeoLocator};
use crate::intake::{self, email_fingerprint};
use crate::mailer::Mailer;
use crate::models::{ContactResponse, GeoLocation, LeadSubmission};
use crate::sheets_client::SheetRecorder;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Mail transport used for both notification and acknowledgment.
    pub mailer: Arc<dyn Mailer>,
    /// Spreadsheet leg; `None` when no webhook URL is configured.
    pub sheets: Option<Arc<dyn SheetRecorder>>,
    /// Process-wide geolocation lookup with its per-IP cache.
    pub geo: GeoLocator,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "ops"
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// POST /api/contact
///
/// Accepts a lead from any site form, validates it, then fans it out to the
/// operator mailbox, the submitter and the leads spreadsheet.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = LeadSubmission,
    responses(
        (status = 200, description = "Lead delivered", body = ContactResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 500, description = "Mail delivery failed", body = ErrorResponse)
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let span = tracing::info_span!("contact_submission", submission_id = %Uuid::new_v4());

    async move {
        let Json(lead) = payload.map_err(|e| {
            tracing::warn!("Unreadable contact payload: {}", e);
            AppError::BadRequest("Invalid request body".to_string())
        })?;

        let prepared = intake::prepare(&lead, &state.config)?;
        tracing::info!(
            "Lead received from {} (email fp={}, services='{}')",
            prepared.source.label(),
            email_fingerprint(&prepared.record.email),
            prepared.services
        );

        dispatcher::fan_out(state.mailer.as_ref(), state.sheets.as_deref(), prepared).await?;

        tracing::info!("Lead dispatched");
        Ok(Json(ContactResponse { success: true }))
    }
    .instrument(span)
    .await
}

/// GET /api/geo
///
/// Resolves the caller's approximate location so forms can attach it to
/// their submission.
#[utoipa::path(
    get,
    path = "/api/geo",
    responses(
        (status = 200, description = "Caller location", body = GeoLocation),
        (status = 400, description = "Caller address unknown", body = ErrorResponse),
        (status = 502, description = "Geolocation upstream failed", body = ErrorResponse)
    ),
    tag = "contact"
)]
pub async fn locate_visitor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<GeoLocation>, AppError> {
    let ip = geolocation::client_ip(&headers, peer.map(|ConnectInfo(addr)| addr))
        .ok_or_else(|| AppError::BadRequest("Unable to determine client address".to_string()))?;

    let location = state.geo.locate(ip).await?;
    Ok(Json(GeoLocation::clone(&location)))
}
