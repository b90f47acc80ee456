use utoipa::OpenApi;

use crate::handlers;
use crate::models::{ContactResponse, ErrorResponse, GeoLocation, LeadSubmission};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::submit_contact,
        handlers::locate_visitor,
    ),
    components(schemas(LeadSubmission, ContactResponse, ErrorResponse, GeoLocation)),
    tags(
        (name = "contact", description = "Lead capture for the SecureLife Fincorp site"),
        (name = "ops", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;
