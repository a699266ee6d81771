//! In-memory store used by the test suite.
//!
//! One async mutex guards the whole state, so every trait method is a single
//! critical section and observes the same linearizable compare-and-set
//! semantics as the Postgres conditional updates.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Event, Notification, NotificationKind, Transaction, TransactionStatus, User};
use crate::store::{LifecycleStore, NewBooking};
use crate::utils::error::AppError;

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    users: HashMap<Uuid, User>,
    transactions: HashMap<Uuid, Transaction>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_event(&self, event: Event) {
        self.inner.lock().await.events.insert(event.id, event);
    }

    pub async fn seed_user(&self, user: User) {
        self.inner.lock().await.users.insert(user.id, user);
    }

    pub async fn seed_transaction(&self, transaction: Transaction) {
        self.inner
            .lock()
            .await
            .transactions
            .insert(transaction.id, transaction);
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().await.notifications.clone()
    }
}

impl Inner {
    fn refund(&mut self, transaction: &Transaction) {
        if let Some(event) = self.events.get_mut(&transaction.event_id) {
            // Same double-release cap as the SQL LEAST(...) clause.
            event.available_seats =
                (event.available_seats + transaction.quantity).min(event.total_seats);
            event.updated_at = Utc::now();
        }
        if transaction.points_used > Decimal::ZERO {
            if let Some(user) = self.users.get_mut(&transaction.user_id) {
                user.points += transaction.points_used;
                user.updated_at = Utc::now();
            }
        }
    }
}

#[async_trait]
impl LifecycleStore for MemoryStore {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.inner.lock().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<Event> = inner.events.values().cloned().collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        Ok(self.inner.lock().await.transactions.get(&id).cloned())
    }

    async fn list_user_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        let inner = self.inner.lock().await;
        let mut transactions: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }

    async fn list_awaiting_confirmation(
        &self,
        organizer_id: Uuid,
    ) -> Result<Vec<Transaction>, AppError> {
        let inner = self.inner.lock().await;
        let mut transactions: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|t| {
                t.status == TransactionStatus::WaitingConfirmation
                    && inner
                        .events
                        .get(&t.event_id)
                        .is_some_and(|e| e.organizer_id == organizer_id)
            })
            .cloned()
            .collect();
        transactions.sort_by_key(|t| t.created_at);
        Ok(transactions)
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Transaction, AppError> {
        let mut inner = self.inner.lock().await;

        {
            let event = inner
                .events
                .get(&booking.event_id)
                .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
            if event.available_seats < booking.quantity {
                return Err(AppError::InsufficientSeats);
            }
        }
        {
            let user = inner
                .users
                .get(&booking.user_id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if user.points < booking.points_used {
                return Err(AppError::InsufficientPoints);
            }
        }

        if let Some(event) = inner.events.get_mut(&booking.event_id) {
            event.available_seats -= booking.quantity;
            event.updated_at = Utc::now();
        }
        if booking.points_used > Decimal::ZERO {
            if let Some(user) = inner.users.get_mut(&booking.user_id) {
                user.points -= booking.points_used;
                user.updated_at = Utc::now();
            }
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            event_id: booking.event_id,
            quantity: booking.quantity,
            original_price: booking.original_price,
            points_used: booking.points_used,
            final_price: booking.final_price,
            status: TransactionStatus::WaitingPayment,
            payment_proof: None,
            expires_at: booking.expires_at,
            created_at: now,
            updated_at: now,
        };
        inner.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn attach_proof(
        &self,
        id: Uuid,
        proof_ref: &str,
    ) -> Result<Option<Transaction>, AppError> {
        let mut inner = self.inner.lock().await;
        let Some(transaction) = inner.transactions.get_mut(&id) else {
            return Ok(None);
        };
        if transaction.status != TransactionStatus::WaitingPayment
            || transaction.expires_at <= Utc::now()
        {
            return Ok(None);
        }
        transaction.payment_proof = Some(proof_ref.to_string());
        transaction.status = TransactionStatus::WaitingConfirmation;
        transaction.updated_at = Utc::now();
        Ok(Some(transaction.clone()))
    }

    async fn mark_done(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        let mut inner = self.inner.lock().await;
        let Some(transaction) = inner.transactions.get_mut(&id) else {
            return Ok(None);
        };
        if transaction.status != TransactionStatus::WaitingConfirmation {
            return Ok(None);
        }
        transaction.status = TransactionStatus::Done;
        transaction.updated_at = Utc::now();
        Ok(Some(transaction.clone()))
    }

    async fn reject_with_refund(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        let mut inner = self.inner.lock().await;
        let Some(transaction) = inner.transactions.get_mut(&id) else {
            return Ok(None);
        };
        if transaction.status != TransactionStatus::WaitingConfirmation {
            return Ok(None);
        }
        transaction.status = TransactionStatus::Rejected;
        transaction.updated_at = Utc::now();
        let transaction = transaction.clone();
        inner.refund(&transaction);
        Ok(Some(transaction))
    }

    async fn expire_with_refund(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>, AppError> {
        let mut inner = self.inner.lock().await;
        let Some(transaction) = inner.transactions.get_mut(&id) else {
            return Ok(None);
        };
        if transaction.status != TransactionStatus::WaitingPayment || transaction.expires_at > now {
            return Ok(None);
        }
        transaction.status = TransactionStatus::Expired;
        transaction.updated_at = now;
        let transaction = transaction.clone();
        inner.refund(&transaction);
        Ok(Some(transaction))
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .transactions
            .values()
            .filter(|t| t.status == TransactionStatus::WaitingPayment && t.expires_at <= now)
            .map(|t| t.id)
            .collect())
    }

    async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            kind,
            created_at: Utc::now(),
        };
        inner.notifications.push(notification);
        Ok(())
    }
}
