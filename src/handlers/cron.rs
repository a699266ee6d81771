use axum::extract::State;
use axum::response::Response;

use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Manual sweeper trigger, kept alongside the scheduled task so an external
/// cron can drive expiry as well.
pub async fn expire_transactions(State(state): State<AppState>) -> Result<Response, AppError> {
    let report = state.service.sweep_expired().await?;
    Ok(success(
        report,
        format!("Processed {} expired transactions", report.processed),
    ))
}
