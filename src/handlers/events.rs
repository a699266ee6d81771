use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.service.list_events().await?;
    Ok(success(events, "Events fetched"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.service.get_event(event_id).await?;
    Ok(success(event, "Event fetched"))
}
