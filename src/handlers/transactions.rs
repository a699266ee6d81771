use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::lifecycle::Decision;
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub event_id: Uuid,
    pub quantity: i32,
    /// Loyalty points the buyer wants applied; capped against balance and
    /// order price server-side.
    #[serde(default)]
    pub points_requested: Decimal,
}

#[derive(Deserialize)]
pub struct PaymentProofRequest {
    /// Opaque reference to the uploaded proof (storage is handled elsewhere).
    pub proof_ref: String,
}

pub async fn create_booking(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Response, AppError> {
    identity.require_customer()?;
    let transaction = state
        .service
        .create_booking(
            identity.user_id,
            body.event_id,
            body.quantity,
            body.points_requested,
        )
        .await?;
    Ok(created(transaction, "Booking created"))
}

pub async fn list_my_transactions(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Response, AppError> {
    let transactions = state.service.list_for_user(identity.user_id).await?;
    Ok(success(transactions, "Transactions fetched"))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    identity: Identity,
    Path(transaction_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let transaction = state
        .service
        .view_transaction(transaction_id, identity.user_id)
        .await?;
    Ok(success(transaction, "Transaction fetched"))
}

pub async fn upload_payment_proof(
    State(state): State<AppState>,
    identity: Identity,
    Path(transaction_id): Path<Uuid>,
    Json(body): Json<PaymentProofRequest>,
) -> Result<Response, AppError> {
    let transaction = state
        .service
        .attach_payment_proof(transaction_id, identity.user_id, &body.proof_ref)
        .await?;
    Ok(success(transaction, "Payment proof uploaded"))
}

pub async fn approve_transaction(
    State(state): State<AppState>,
    identity: Identity,
    Path(transaction_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let transaction = state
        .service
        .decide(transaction_id, identity.user_id, Decision::Approve)
        .await?;
    Ok(success(transaction, "Transaction approved"))
}

pub async fn reject_transaction(
    State(state): State<AppState>,
    identity: Identity,
    Path(transaction_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let transaction = state
        .service
        .decide(transaction_id, identity.user_id, Decision::Reject)
        .await?;
    Ok(success(
        transaction,
        "Transaction rejected, seats and points returned",
    ))
}
