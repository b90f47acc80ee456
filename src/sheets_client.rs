use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{SheetAck, SheetRecord};

/// Destination for lead rows.
#[async_trait]
pub trait SheetRecorder: Send + Sync {
    async fn record(&self, record: &SheetRecord) -> Result<SheetAck, AppError>;
}

/// Client for the Apps Script webhook that appends rows to the leads sheet.
///
/// Uses the reqwest default client, so there is no request timeout.
#[derive(Clone)]
pub struct AppsScriptClient {
    client: reqwest::Client,
    webhook_url: String,
}

impl AppsScriptClient {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl SheetRecorder for AppsScriptClient {
    /// Posts one row. Non-2xx replies, unparseable bodies and `success: false`
    /// are all errors; callers decide whether they matter.
    async fn record(&self, record: &SheetRecord) -> Result<SheetAck, AppError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(record)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Sheets request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Sheets webhook returned {}: {}",
                status, error_text
            )));
        }

        let ack: SheetAck = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Sheets response: {}", e))
        })?;

        if !ack.success {
            return Err(AppError::ExternalApiError(format!(
                "Sheets webhook rejected row: {}",
                ack.message.as_deref().unwrap_or("no message")
            )));
        }

        tracing::debug!(
            "Sheets webhook accepted row: {}",
            ack.message.as_deref().unwrap_or("")
        );
        Ok(ack)
    }
}
