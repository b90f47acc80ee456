//! Submission intake.
//!
//! Turns a raw [`LeadSubmission`] into everything the dispatcher needs: the
//! operator notification, the customer acknowledgment and the spreadsheet
//! record. Validation happens first; nothing here performs I/O.

use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::errors::AppError;
use crate::mailer::OutboundEmail;
use crate::models::{FormSource, LeadSubmission, SheetRecord};
use crate::templates::{
    self, AcknowledgmentContext, NotificationContext, ACKNOWLEDGMENT_TEMPLATE,
    NOTIFICATION_TEMPLATE,
};

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const FORM_TYPE: &str = "Website Inquiry";
pub const UNKNOWN: &str = "Unknown";
const DEFAULT_TOPIC: &str = "Inquiry";

/// Output of intake, ready for fan-out.
#[derive(Debug, Clone)]
pub struct PreparedLead {
    pub source: FormSource,
    pub services: String,
    pub notification: OutboundEmail,
    pub acknowledgment: OutboundEmail,
    pub record: SheetRecord,
}

/// Required fields, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields<'a> {
    pub first_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

fn or_unknown(value: &Option<String>) -> &str {
    match text(value) {
        "" => UNKNOWN,
        v => v,
    }
}

/// Checks that given name, email and phone are present and non-blank.
pub fn validate(lead: &LeadSubmission) -> Result<RequiredFields<'_>, AppError> {
    let first_name = text(&lead.first_name);
    let email = text(&lead.email);
    let phone = text(&lead.phone);

    if first_name.is_empty() || email.is_empty() || phone.is_empty() {
        return Err(AppError::Validation(MISSING_FIELDS.to_string()));
    }

    Ok(RequiredFields {
        first_name,
        email,
        phone,
    })
}

/// Given name plus family name, or the given name alone when the family name is blank.
pub fn display_name(first_name: &str, last_name: &Option<String>) -> String {
    match text(last_name) {
        "" => first_name.to_string(),
        last => format!("{} {}", first_name, last),
    }
}

/// Fixed-format location block appended to every message.
pub fn geolocation_trailer(lead: &LeadSubmission) -> String {
    format!(
        "\n\n--- Geolocation Info ---\nLocation: {}\nPincode: {}\nIP Address: {}",
        or_unknown(&lead.user_location),
        or_unknown(&lead.user_pincode),
        or_unknown(&lead.user_ip),
    )
}

/// Short, stable identifier for an email address, safe to put in logs.
pub fn email_fingerprint(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    hex::encode(&hasher.finalize()[..6])
}

/// Validates and renders a submission. Fails before producing anything when
/// a required field is missing.
pub fn prepare(lead: &LeadSubmission, config: &Config) -> Result<PreparedLead, AppError> {
    let required = validate(lead)?;

    let brand = config.mail_from_name.as_str();
    let source = FormSource::from_tag(lead.source.as_deref());
    let display_name = display_name(required.first_name, &lead.last_name);
    let services = lead.services_display();
    let message = text(&lead.message);
    let final_message = format!("{}{}", message, geolocation_trailer(lead));
    let extra_info = text(&lead.extra_info);

    let notification_html = templates::render(
        NOTIFICATION_TEMPLATE,
        &NotificationContext {
            brand,
            source_label: source.label(),
            full_name: &display_name,
            email: required.email,
            phone: required.phone,
            subject: text(&lead.subject),
            business_type: text(&lead.business_type),
            services: &services,
            turnover: text(&lead.annual_turnover),
            message_lines: if message.is_empty() {
                Vec::new()
            } else {
                final_message.split('\n').collect()
            },
            extra_info,
        },
    )?;

    let acknowledgment_html = templates::render(
        ACKNOWLEDGMENT_TEMPLATE,
        &AcknowledgmentContext {
            brand,
            first_name: required.first_name,
        },
    )?;

    let topic = services
        .split(',')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TOPIC);

    let notification = OutboundEmail {
        to: config.email_receiver.clone(),
        reply_to: Some(required.email.to_string()),
        subject: format!("New Lead: {} ({})", display_name, topic),
        html: notification_html,
    };

    let acknowledgment = OutboundEmail {
        to: Some(required.email.to_string()),
        reply_to: None,
        subject: format!("We've received your request - {}", brand),
        html: acknowledgment_html,
    };

    let record = SheetRecord {
        source: source.label().to_string(),
        form_type: FORM_TYPE.to_string(),
        name: display_name,
        email: required.email.to_string(),
        phone: required.phone.to_string(),
        message: final_message,
        extra_info: if extra_info.is_empty() {
            format!("Services: {}", services)
        } else {
            extra_info.to_string()
        },
        business_type: text(&lead.business_type).to_string(),
        services: services.clone(),
        turnover: text(&lead.annual_turnover).to_string(),
    };

    Ok(PreparedLead {
        source,
        services,
        notification,
        acknowledgment,
        record,
    })
}
