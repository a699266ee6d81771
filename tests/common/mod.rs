#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use eventku_server::lifecycle::LifecycleService;
use eventku_server::models::{
    Event, NotificationKind, Role, Transaction, TransactionStatus, User,
};
use eventku_server::notifier::Notifier;
use eventku_server::store::{LifecycleStore, MemoryStore, NewBooking};
use eventku_server::utils::error::AppError;

pub struct TestContext {
    pub service: LifecycleService,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Service wired to an in-memory store and a recording notifier.
pub fn context(payment_window: Duration) -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = LifecycleService::new(store.clone(), notifier.clone(), payment_window);
    TestContext {
        service,
        store,
        notifier,
    }
}

pub fn make_event(organizer_id: Uuid, price: i64, total: i32, available: i32) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        organizer_id,
        title: "Jazz Night".to_string(),
        description: Some("An evening of live jazz".to_string()),
        location: "Jakarta Convention Center".to_string(),
        starts_at: now + Duration::days(30),
        price: Decimal::from(price),
        total_seats: total,
        available_seats: available,
        created_at: now,
        updated_at: now,
    }
}

pub fn make_user(points: i64, role: Role) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: format!("{}@example.com", Uuid::new_v4()),
        role,
        points: Decimal::from(points),
        referral_code: Uuid::new_v4().to_string()[..8].to_uppercase(),
        referral_count: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn make_transaction(
    user_id: Uuid,
    event_id: Uuid,
    status: TransactionStatus,
    quantity: i32,
    points_used: i64,
    expires_at: DateTime<Utc>,
) -> Transaction {
    let now = Utc::now();
    let original = Decimal::from(150_000) * Decimal::from(quantity);
    Transaction {
        id: Uuid::new_v4(),
        user_id,
        event_id,
        quantity,
        original_price: original,
        points_used: Decimal::from(points_used),
        final_price: original - Decimal::from(points_used),
        status,
        payment_proof: if status == TransactionStatus::WaitingPayment {
            None
        } else {
            Some("proof-123.png".to_string())
        },
        expires_at,
        created_at: now,
        updated_at: now,
    }
}

/// Records every delivered notification for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Uuid, String, NotificationKind)>>,
}

impl RecordingNotifier {
    pub async fn sent_to(&self, user_id: Uuid) -> Vec<(String, NotificationKind)> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(id, _, _)| *id == user_id)
            .map(|(_, title, kind)| (title.clone(), *kind))
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        _message: &str,
        kind: NotificationKind,
    ) -> Result<(), AppError> {
        self.sent.lock().await.push((user_id, title.to_string(), kind));
        Ok(())
    }
}

/// Always fails; used to show that notification failures do not roll back
/// state transitions.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(
        &self,
        _user_id: Uuid,
        _title: &str,
        _message: &str,
        _kind: NotificationKind,
    ) -> Result<(), AppError> {
        Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut))
    }
}

/// Store wrapper that fails `expire_with_refund` for one chosen transaction,
/// for exercising the sweeper's continue-past-failure behavior.
pub struct FlakyStore {
    pub inner: Arc<MemoryStore>,
    pub fail_id: Uuid,
}

#[async_trait]
impl LifecycleStore for FlakyStore {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        self.inner.find_event(id).await
    }

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        self.inner.list_events().await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.inner.find_user(id).await
    }

    async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        self.inner.find_transaction(id).await
    }

    async fn list_user_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        self.inner.list_user_transactions(user_id).await
    }

    async fn list_awaiting_confirmation(
        &self,
        organizer_id: Uuid,
    ) -> Result<Vec<Transaction>, AppError> {
        self.inner.list_awaiting_confirmation(organizer_id).await
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Transaction, AppError> {
        self.inner.create_booking(booking).await
    }

    async fn attach_proof(
        &self,
        id: Uuid,
        proof_ref: &str,
    ) -> Result<Option<Transaction>, AppError> {
        self.inner.attach_proof(id, proof_ref).await
    }

    async fn mark_done(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        self.inner.mark_done(id).await
    }

    async fn reject_with_refund(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        self.inner.reject_with_refund(id).await
    }

    async fn expire_with_refund(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>, AppError> {
        if id == self.fail_id {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        self.inner.expire_with_refund(id, now).await
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, AppError> {
        self.inner.list_expired(now).await
    }

    async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), AppError> {
        self.inner
            .insert_notification(user_id, title, message, kind)
            .await
    }
}
