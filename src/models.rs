use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Renders a JSON scalar as text. Numbers and booleans are accepted so that a
/// form sending `"annualTurnover": 5000000` is not rejected outright.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Lenient text field: any scalar becomes a string, anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

/// Lead payload posted by every form on the site.
///
/// All fields are optional at the serde level so that a missing required
/// field surfaces as a validation error rather than a deserialization one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subject: Option<String>,
    /// Form tag, e.g. `hero`, `high-intent-modal`, `contact-page-high-intent`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub business_type: Option<String>,
    /// Array or single value. Takes precedence over `mainRiskConcern`.
    #[schema(value_type = Option<Vec<String>>)]
    pub selected_services: Option<ServiceSelection>,
    /// Older alias of `selectedServices` used by the hero banner form.
    #[schema(value_type = Option<Vec<String>>)]
    pub main_risk_concern: Option<ServiceSelection>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub annual_turnover: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub extra_info: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_pincode: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub user_ip: Option<String>,
}

/// Service interests, sent either as a list or as a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServiceSelection {
    Many(Vec<String>),
    One(String),
}

impl<'de> Deserialize<'de> for ServiceSelection {
    /// Arrays keep their items in order, with non-scalar items rendered empty.
    /// Any other value passes through as its text; objects count as blank.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => ServiceSelection::Many(
                items
                    .into_iter()
                    .map(|item| scalar_text(item).unwrap_or_default())
                    .collect(),
            ),
            other => ServiceSelection::One(scalar_text(other).unwrap_or_default()),
        })
    }
}

impl ServiceSelection {
    /// Lists are joined with `", "`, a single value passes through unchanged.
    pub fn display(&self) -> String {
        match self {
            ServiceSelection::Many(items) => items.join(", "),
            ServiceSelection::One(value) => value.clone(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, ServiceSelection::One(value) if value.is_empty())
    }
}

impl LeadSubmission {
    /// Picks `selectedServices`, falling back to `mainRiskConcern`, and renders
    /// the display string. Absent selections render as an empty string.
    pub fn services_display(&self) -> String {
        self.selected_services
            .as_ref()
            .filter(|s| !s.is_blank())
            .or(self.main_risk_concern.as_ref())
            .map(ServiceSelection::display)
            .unwrap_or_default()
    }
}

/// The form a submission came from. Only used to pick a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormSource {
    HeroModal,
    HeroBanner,
    HighIntentModal,
    #[default]
    ContactPage,
}

impl FormSource {
    /// Unknown or missing tags fall back to the contact page label.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("hero") => FormSource::HeroModal,
            Some("hero-direct-form") => FormSource::HeroBanner,
            Some("high-intent-modal") => FormSource::HighIntentModal,
            _ => FormSource::ContactPage,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormSource::HeroModal => "Hero Modal Form",
            FormSource::HeroBanner => "Hero Banner Form",
            FormSource::HighIntentModal => "High Intent Modal",
            FormSource::ContactPage => "Contact Page",
        }
    }
}

/// Row payload posted to the spreadsheet webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRecord {
    pub source: String,
    pub form_type: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub extra_info: String,
    pub business_type: String,
    pub services: String,
    pub turnover: String,
}

/// Reply from the spreadsheet webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Success body for `POST /api/contact`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
}

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Best-effort location of a visitor, resolved from their IP address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GeoLocation {
    pub city: String,
    pub region: String,
    pub pincode: String,
    pub country: String,
    pub ip: String,
}
