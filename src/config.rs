use serde::Deserialize;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_FROM_NAME: &str = "SecureLife Fincorp";
pub const DEFAULT_GEO_API_URL: &str = "https://ipapi.co";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Mail account identity; also the SMTP username.
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    /// Operator notification recipient.
    pub email_receiver: Option<String>,
    pub smtp_host: String,
    pub mail_from_name: String,
    /// Spreadsheet webhook. `None` disables the spreadsheet leg.
    pub sheets_webhook_url: Option<String>,
    pub geo_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            email_user: None,
            email_pass: None,
            email_receiver: None,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            mail_from_name: DEFAULT_FROM_NAME.to_string(),
            sheets_webhook_url: None,
            geo_api_url: DEFAULT_GEO_API_URL.to_string(),
        }
    }
}

/// Reads an env var, treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn validate_http_url(name: &str, raw: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(raw)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            email_user: optional_var("EMAIL_USER"),
            email_pass: optional_var("EMAIL_PASS"),
            email_receiver: optional_var("EMAIL_RECEIVER"),
            smtp_host: optional_var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            mail_from_name: optional_var("MAIL_FROM_NAME")
                .unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
            sheets_webhook_url: optional_var("GOOGLE_APPS_SCRIPT_URL")
                .map(|url| validate_http_url("GOOGLE_APPS_SCRIPT_URL", url))
                .transpose()?,
            geo_api_url: optional_var("GEO_API_URL")
                .map(|url| validate_http_url("GEO_API_URL", url))
                .transpose()?
                .unwrap_or_else(|| DEFAULT_GEO_API_URL.to_string()),
        };

        // Log what is wired up (without sensitive values)
        tracing::debug!("SMTP host: {}", config.smtp_host);
        if config.email_user.is_none() || config.email_pass.is_none() {
            tracing::warn!("EMAIL_USER/EMAIL_PASS not set; mail sends will fail");
        }
        if config.email_receiver.is_none() {
            tracing::warn!("EMAIL_RECEIVER not set; operator notifications will fail");
        }
        match config.sheets_webhook_url {
            Some(_) => tracing::info!("Spreadsheet webhook configured"),
            None => tracing::info!("GOOGLE_APPS_SCRIPT_URL not set; spreadsheet leg disabled"),
        }
        tracing::debug!("Geolocation API: {}", config.geo_api_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
