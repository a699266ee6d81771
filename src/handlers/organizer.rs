use axum::extract::State;
use axum::response::Response;

use crate::auth::Identity;
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Review queue: transactions on the caller's events awaiting a decision.
pub async fn pending_transactions(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Response, AppError> {
    identity.require_organizer()?;
    let transactions = state.service.organizer_queue(identity.user_id).await?;
    Ok(success(transactions, "Pending transactions fetched"))
}
