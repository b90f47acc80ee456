//! HTML email templates.
//!
//! Templates are compiled into the binary and rendered with minijinja. Names
//! end in `.html`, so every interpolated value is HTML-escaped.

use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;

use crate::errors::AppError;

pub const NOTIFICATION_TEMPLATE: &str = "notification.html";
pub const ACKNOWLEDGMENT_TEMPLATE: &str = "acknowledgment.html";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    let templates = [
        (
            NOTIFICATION_TEMPLATE,
            include_str!("../templates/notification.html"),
        ),
        (
            ACKNOWLEDGMENT_TEMPLATE,
            include_str!("../templates/acknowledgment.html"),
        ),
    ];

    for (name, source) in templates {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to load template {}: {}", name, e);
        }
    }

    env
}

fn environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Context for the operator notification. Empty strings hide their section.
#[derive(Debug, Serialize)]
pub struct NotificationContext<'a> {
    pub brand: &'a str,
    pub source_label: &'a str,
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub subject: &'a str,
    pub business_type: &'a str,
    pub services: &'a str,
    pub turnover: &'a str,
    /// Empty when the submitter wrote no message.
    pub message_lines: Vec<&'a str>,
    pub extra_info: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AcknowledgmentContext<'a> {
    pub brand: &'a str,
    pub first_name: &'a str,
}

pub fn render<S: Serialize>(template_name: &str, ctx: &S) -> Result<String, AppError> {
    let template = environment().get_template(template_name)?;
    Ok(template.render(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(message_lines: Vec<&'static str>) -> NotificationContext<'static> {
        NotificationContext {
            brand: "SecureLife Fincorp",
            source_label: "Contact Page",
            full_name: "Asha Rao",
            email: "a@x.com",
            phone: "9999999999",
            subject: "",
            business_type: "",
            services: "",
            turnover: "",
            message_lines,
            extra_info: "",
        }
    }

    #[test]
    fn test_notification_hides_empty_sections() {
        let html = render(NOTIFICATION_TEMPLATE, &notification(vec![])).unwrap();

        assert!(html.contains("Asha Rao"));
        assert!(html.contains("From: Contact Page"));
        assert!(html.contains("mailto:a@x.com"));
        assert!(!html.contains("Business Type"));
        assert!(!html.contains("Interested Services"));
        assert!(!html.contains("Message:"));
        assert!(!html.contains("Audit Info"));
    }

    #[test]
    fn test_notification_joins_message_lines_with_br() {
        let html = render(NOTIFICATION_TEMPLATE, &notification(vec!["first", "second"])).unwrap();
        assert!(html.contains("first<br>second"));
    }

    #[test]
    fn test_user_values_are_escaped() {
        let mut ctx = notification(vec!["<script>alert(1)</script>"]);
        ctx.business_type = "Tom & Jerry";

        let html = render(NOTIFICATION_TEMPLATE, &ctx).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Tom &amp; Jerry"));
    }

    #[test]
    fn test_acknowledgment_greets_by_first_name() {
        let html = render(
            ACKNOWLEDGMENT_TEMPLATE,
            &AcknowledgmentContext {
                brand: "SecureLife Fincorp",
                first_name: "Asha",
            },
        )
        .unwrap();
        assert!(html.contains("Thank You, Asha!"));
        assert!(html.contains("SecureLife Fincorp Team"));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let result = render("missing.html", &AcknowledgmentContext {
            brand: "x",
            first_name: "y",
        });
        assert!(matches!(result, Err(AppError::Dispatch(_))));
    }
}
