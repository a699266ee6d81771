//! Booking lifecycle service.
//!
//! Owns every transition of a transaction and all movement on the seat and
//! points ledgers. Guards run here against a fresh read; the store's
//! compare-and-set updates re-check them at commit time, so a guard that
//! passed but lost the race surfaces as a `None` transition and is mapped
//! back to the right error.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Event, NotificationKind, Transaction, TransactionStatus};
use crate::notifier::Notifier;
use crate::store::{LifecycleStore, NewBooking};
use crate::utils::error::AppError;

/// Organizer verdict on a transaction awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SweepReport {
    /// Transactions moved to `EXPIRED` this run.
    pub processed: usize,
    /// Transactions that errored; logged and skipped.
    pub failed: usize,
}

/// `points_used = min(requested, balance, original_price)`.
///
/// The ledger only enforces a non-negative balance; the cap against the
/// order price lives here so points never exceed what the booking costs.
fn cap_points(requested: Decimal, balance: Decimal, original_price: Decimal) -> Decimal {
    requested.min(balance).min(original_price)
}

#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn LifecycleStore>,
    notifier: Arc<dyn Notifier>,
    payment_window: Duration,
}

impl LifecycleService {
    pub fn new(
        store: Arc<dyn LifecycleStore>,
        notifier: Arc<dyn Notifier>,
        payment_window: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            payment_window,
        }
    }

    /// Reserves seats, debits points and opens a `WAITING_PAYMENT`
    /// transaction. A ledger update lost to a concurrent writer is retried
    /// once against fresh reads before the shortage is surfaced.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        quantity: i32,
        points_requested: Decimal,
    ) -> Result<Transaction, AppError> {
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }
        if points_requested < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Points requested cannot be negative".to_string(),
            ));
        }

        let mut attempt = 0;
        loop {
            let event = self
                .store
                .find_event(event_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
            let user = self
                .store
                .find_user(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

            if event.available_seats < quantity {
                return Err(AppError::InsufficientSeats);
            }

            let original_price = event.price * Decimal::from(quantity);
            let points_used = cap_points(points_requested, user.points, original_price);
            let booking = NewBooking {
                user_id,
                event_id,
                quantity,
                original_price,
                points_used,
                final_price: original_price - points_used,
                expires_at: Utc::now() + self.payment_window,
            };

            match self.store.create_booking(booking).await {
                Ok(transaction) => {
                    tracing::info!(
                        transaction_id = %transaction.id,
                        event_id = %event_id,
                        quantity,
                        points_used = %points_used,
                        "Booking created"
                    );
                    return Ok(transaction);
                }
                Err(AppError::InsufficientSeats | AppError::InsufficientPoints)
                    if attempt == 0 =>
                {
                    // Lost a conditional update race; re-read and try again.
                    attempt += 1;
                    tracing::debug!(event_id = %event_id, "Ledger race lost, retrying booking");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Records the payment proof and moves the transaction to
    /// `WAITING_CONFIRMATION`. Owner only, before the deadline.
    pub async fn attach_payment_proof(
        &self,
        transaction_id: Uuid,
        caller: Uuid,
        proof_ref: &str,
    ) -> Result<Transaction, AppError> {
        if proof_ref.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Proof reference must not be empty".to_string(),
            ));
        }

        let transaction = self.get(transaction_id).await?;
        if transaction.user_id != caller {
            return Err(AppError::Forbidden(
                "Only the buyer may upload payment proof".to_string(),
            ));
        }
        match transaction.status {
            TransactionStatus::WaitingPayment => {}
            TransactionStatus::Expired => return Err(AppError::Expired),
            other => return Err(AppError::InvalidState(status_name(other).to_string())),
        }
        if Utc::now() >= transaction.expires_at {
            return Err(AppError::Expired);
        }

        // The sweeper may expire the transaction between the read above and
        // this update; the status guard catches that.
        self.store
            .attach_proof(transaction_id, proof_ref)
            .await?
            .ok_or(AppError::Expired)
    }

    /// Organizer decision on a transaction awaiting confirmation. Approval
    /// completes the sale with no ledger movement; rejection returns the
    /// seats and points and notifies the buyer exactly once.
    pub async fn decide(
        &self,
        transaction_id: Uuid,
        caller: Uuid,
        decision: Decision,
    ) -> Result<Transaction, AppError> {
        let transaction = self.get(transaction_id).await?;
        let event = self
            .store
            .find_event(transaction.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        if event.organizer_id != caller {
            return Err(AppError::Forbidden(
                "Only the event organizer may decide on this transaction".to_string(),
            ));
        }
        if transaction.status != TransactionStatus::WaitingConfirmation {
            return Err(AppError::InvalidState(
                status_name(transaction.status).to_string(),
            ));
        }

        match decision {
            Decision::Approve => {
                if transaction.payment_proof.is_none() {
                    return Err(AppError::ValidationError(
                        "No payment proof on record".to_string(),
                    ));
                }
                let updated = self
                    .store
                    .mark_done(transaction_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::InvalidState(status_name(transaction.status).to_string())
                    })?;
                tracing::info!(transaction_id = %transaction_id, "Transaction approved");
                Ok(updated)
            }
            Decision::Reject => {
                let updated = self
                    .store
                    .reject_with_refund(transaction_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::InvalidState(status_name(transaction.status).to_string())
                    })?;
                tracing::info!(
                    transaction_id = %transaction_id,
                    seats_returned = updated.quantity,
                    points_returned = %updated.points_used,
                    "Transaction rejected"
                );
                self.notify(
                    updated.user_id,
                    "Payment rejected",
                    &format!(
                        "Your payment for \"{}\" was rejected by the organizer. \
                         The reserved seats and any points you spent have been returned.",
                        event.title
                    ),
                    NotificationKind::Transaction,
                )
                .await;
                Ok(updated)
            }
        }
    }

    /// Forces an overdue `WAITING_PAYMENT` transaction into `EXPIRED` with
    /// the same refund as rejection. Idempotent: anything else is a no-op,
    /// because the sweeper may race with user and organizer actions.
    pub async fn expire(
        &self,
        transaction_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>, AppError> {
        let Some(expired) = self.store.expire_with_refund(transaction_id, now).await? else {
            return Ok(None);
        };

        let event_title = self
            .store
            .find_event(expired.event_id)
            .await
            .ok()
            .flatten()
            .map(|e| e.title);
        let message = match event_title {
            Some(title) => format!(
                "Your transaction for \"{title}\" expired because no payment \
                 was received within the deadline. Seats and points have been returned."
            ),
            None => "Your transaction expired because no payment was received \
                     within the deadline. Seats and points have been returned."
                .to_string(),
        };
        self.notify(
            expired.user_id,
            "Transaction expired",
            &message,
            NotificationKind::System,
        )
        .await;

        tracing::info!(transaction_id = %transaction_id, "Transaction expired");
        Ok(Some(expired))
    }

    /// One sweeper pass. Each overdue transaction is expired independently;
    /// a failure is logged and counted without stopping the rest.
    pub async fn sweep_expired(&self) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let ids = self.store.list_expired(now).await?;
        let mut report = SweepReport::default();

        for id in ids {
            match self.expire(id, now).await {
                Ok(Some(_)) => report.processed += 1,
                Ok(None) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(transaction_id = %id, error = ?e, "Failed to expire transaction");
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            failed = report.failed,
            "Expiry sweep finished"
        );
        Ok(report)
    }

    /// Snapshot visible to the buyer or the event's organizer.
    pub async fn view_transaction(
        &self,
        transaction_id: Uuid,
        caller: Uuid,
    ) -> Result<Transaction, AppError> {
        let transaction = self.get(transaction_id).await?;
        if transaction.user_id == caller {
            return Ok(transaction);
        }
        let event = self
            .store
            .find_event(transaction.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        if event.organizer_id == caller {
            return Ok(transaction);
        }
        Err(AppError::Forbidden(
            "Not a party to this transaction".to_string(),
        ))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        self.store.list_user_transactions(user_id).await
    }

    pub async fn organizer_queue(&self, organizer_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        self.store.list_awaiting_confirmation(organizer_id).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        self.store.list_events().await
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event, AppError> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    async fn get(&self, transaction_id: Uuid) -> Result<Transaction, AppError> {
        self.store
            .find_transaction(transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
    }

    async fn notify(&self, user_id: Uuid, title: &str, message: &str, kind: NotificationKind) {
        if let Err(e) = self.notifier.notify(user_id, title, message, kind).await {
            tracing::warn!(user_id = %user_id, error = ?e, "Failed to deliver notification");
        }
    }
}

fn status_name(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::WaitingPayment => "WAITING_PAYMENT",
        TransactionStatus::WaitingConfirmation => "WAITING_CONFIRMATION",
        TransactionStatus::Done => "DONE",
        TransactionStatus::Rejected => "REJECTED",
        TransactionStatus::Expired => "EXPIRED",
    }
}
