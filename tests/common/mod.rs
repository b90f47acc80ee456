//! Stub collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use securelife_contact_api::config::Config;
use securelife_contact_api::errors::AppError;
use securelife_contact_api::geolocation::GeoLocator;
use securelife_contact_api::handlers::AppState;
use securelife_contact_api::mailer::{Mailer, OutboundEmail};
use securelife_contact_api::models::{SheetAck, SheetRecord};
use securelife_contact_api::sheets_client::SheetRecorder;
use std::sync::{Arc, Mutex};

pub const OPERATOR: &str = "owner@securelife.test";

/// Records every email; fails sends addressed to `fail_to`.
#[derive(Default)]
pub struct StubMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail_to: Option<String>,
}

impl StubMailer {
    pub fn failing_for(address: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_to: Some(address.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        let fail = self.fail_to.is_some() && email.to == self.fail_to;
        self.sent.lock().unwrap().push(email);
        if fail {
            return Err(AppError::Dispatch("SMTP error: 550 mailbox unavailable".to_string()));
        }
        Ok(())
    }
}

/// Records every row; fails every call when `fail` is set.
#[derive(Default)]
pub struct StubSheets {
    pub records: Mutex<Vec<SheetRecord>>,
    pub fail: bool,
}

impl StubSheets {
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<SheetRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetRecorder for StubSheets {
    async fn record(&self, record: &SheetRecord) -> Result<SheetAck, AppError> {
        self.records.lock().unwrap().push(record.clone());
        if self.fail {
            return Err(AppError::ExternalApiError("connection refused".to_string()));
        }
        Ok(SheetAck {
            success: true,
            message: Some("Data saved successfully".to_string()),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        email_user: Some("site@securelife.test".to_string()),
        email_pass: Some("app-password".to_string()),
        email_receiver: Some(OPERATOR.to_string()),
        ..Config::default()
    }
}

pub fn test_state(
    mailer: Arc<StubMailer>,
    sheets: Option<Arc<StubSheets>>,
    geo_api_url: &str,
) -> Arc<AppState> {
    Arc::new(AppState {
        config: test_config(),
        mailer,
        sheets: sheets.map(|s| s as Arc<dyn SheetRecorder>),
        geo: GeoLocator::new(geo_api_url.to_string()).unwrap(),
    })
}
