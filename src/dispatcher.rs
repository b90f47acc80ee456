//! Fan-out of a prepared lead to the mail relay and the spreadsheet webhook.
//!
//! The three legs run concurrently and are all awaited. Mail failures fail the
//! whole dispatch; spreadsheet failures are logged and dropped. Nothing is
//! retried.

use crate::errors::{AppError, ResultExt};
use crate::intake::PreparedLead;
use crate::mailer::Mailer;
use crate::models::SheetRecord;
use crate::sheets_client::SheetRecorder;

/// Aggregate result of one fan-out. Per-leg detail is not kept.
pub type DispatchOutcome = Result<(), AppError>;

/// Tags a mail-leg failure with its leg name, forcing it into a dispatch error.
fn mail_leg(result: Result<(), AppError>, leg: &str) -> Result<(), AppError> {
    result
        .map_err(|e| {
            if matches!(e.root(), AppError::Dispatch(_)) {
                e
            } else {
                AppError::Dispatch(e.to_string())
            }
        })
        .context(leg)
}

/// Posts the row if a recorder is configured. Never fails.
async fn record_best_effort(sheets: Option<&dyn SheetRecorder>, record: &SheetRecord) {
    let Some(sheets) = sheets else {
        return;
    };

    match sheets.record(record).await {
        Ok(_) => tracing::info!("Lead row recorded in spreadsheet"),
        Err(e) => tracing::error!("Google Sheets error: {}", e),
    }
}

/// Sends the operator notification and customer acknowledgment and records
/// the spreadsheet row, all concurrently.
pub async fn fan_out(
    mailer: &dyn Mailer,
    sheets: Option<&dyn SheetRecorder>,
    prepared: PreparedLead,
) -> DispatchOutcome {
    let PreparedLead {
        notification,
        acknowledgment,
        record,
        ..
    } = prepared;

    let (notified, acknowledged, ()) = tokio::join!(
        mailer.send(notification),
        mailer.send(acknowledgment),
        record_best_effort(sheets, &record),
    );

    mail_leg(notified, "operator notification")?;
    mail_leg(acknowledged, "customer acknowledgment")?;

    Ok(())
}
