//! Persistence port for the booking lifecycle.
//!
//! All writes to the two shared counters (`events.available_seats` and
//! `users.points`) go through this trait; no handler touches them directly.
//! Status transitions are compare-and-set: they return `None` when the
//! guarding predicate no longer holds, so callers can distinguish a lost race
//! from a store failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Event, NotificationKind, Transaction, User};
use crate::utils::error::AppError;

pub mod inventory;
pub mod memory;
pub mod points;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Everything needed to insert a `WAITING_PAYMENT` row after the caller has
/// computed the price and the capped points debit.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub original_price: Decimal,
    pub points_used: Decimal,
    pub final_price: Decimal,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait LifecycleStore: Send + Sync {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    async fn list_events(&self) -> Result<Vec<Event>, AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>, AppError>;

    /// Caller's transactions, newest first.
    async fn list_user_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, AppError>;

    /// `WAITING_CONFIRMATION` transactions for events owned by the organizer,
    /// oldest first (review queue order).
    async fn list_awaiting_confirmation(
        &self,
        organizer_id: Uuid,
    ) -> Result<Vec<Transaction>, AppError>;

    /// Reserves seats, debits points and inserts the transaction as one
    /// atomic unit. Fails with `InsufficientSeats` / `InsufficientPoints`
    /// when a conditional ledger update finds no matching row; nothing is
    /// left behind in that case.
    async fn create_booking(&self, booking: NewBooking) -> Result<Transaction, AppError>;

    /// `WAITING_PAYMENT -> WAITING_CONFIRMATION`, recording the proof
    /// reference. `None` when the transaction is no longer awaiting payment.
    async fn attach_proof(
        &self,
        id: Uuid,
        proof_ref: &str,
    ) -> Result<Option<Transaction>, AppError>;

    /// `WAITING_CONFIRMATION -> DONE`. No ledger movement.
    async fn mark_done(&self, id: Uuid) -> Result<Option<Transaction>, AppError>;

    /// `WAITING_CONFIRMATION -> REJECTED` plus the compensating seat release
    /// and points credit, all in one atomic unit.
    async fn reject_with_refund(&self, id: Uuid) -> Result<Option<Transaction>, AppError>;

    /// `WAITING_PAYMENT -> EXPIRED` guarded by `expires_at <= now`, plus the
    /// same compensating refund as rejection. `None` when the guard does not
    /// hold, which makes the operation idempotent under sweeper races.
    async fn expire_with_refund(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>, AppError>;

    /// Ids of `WAITING_PAYMENT` transactions whose deadline has passed.
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, AppError>;

    async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), AppError>;
}
