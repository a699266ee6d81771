//! Postgres-backed store.
//!
//! The booking insert and the two refund paths each run inside a single
//! database transaction, so the seat/point movements and the status flip
//! commit or roll back together. Status transitions use
//! `UPDATE ... WHERE status = $from RETURNING *`; an empty result means the
//! guard lost and no side effect happened.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, NotificationKind, Transaction, TransactionStatus, User};
use crate::store::{inventory, points, LifecycleStore, NewBooking};
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

#[async_trait]
impl LifecycleStore for PgStore {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY starts_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(transaction)
    }

    async fn list_user_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    async fn list_awaiting_confirmation(
        &self,
        organizer_id: Uuid,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT t.*
            FROM transactions t
            JOIN events e ON e.id = t.event_id
            WHERE e.organizer_id = $1 AND t.status = $2
            ORDER BY t.created_at
            "#,
        )
        .bind(organizer_id)
        .bind(TransactionStatus::WaitingConfirmation)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Transaction, AppError> {
        let mut db_tx = self.pool.begin().await?;

        inventory::reserve(&mut *db_tx, booking.event_id, booking.quantity).await?;
        if booking.points_used > Decimal::ZERO {
            points::debit(&mut *db_tx, booking.user_id, booking.points_used).await?;
        }

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (user_id, event_id, quantity, original_price, points_used,
                 final_price, status, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.event_id)
        .bind(booking.quantity)
        .bind(booking.original_price)
        .bind(booking.points_used)
        .bind(booking.final_price)
        .bind(TransactionStatus::WaitingPayment)
        .bind(booking.expires_at)
        .fetch_one(&mut *db_tx)
        .await?;

        db_tx.commit().await?;
        Ok(transaction)
    }

    async fn attach_proof(
        &self,
        id: Uuid,
        proof_ref: &str,
    ) -> Result<Option<Transaction>, AppError> {
        // The deadline is part of the predicate so a proof can never land
        // in the window between the service's check and this update.
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET payment_proof = $2, status = $3, updated_at = now()
            WHERE id = $1 AND status = $4 AND expires_at > now()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(proof_ref)
        .bind(TransactionStatus::WaitingConfirmation)
        .bind(TransactionStatus::WaitingPayment)
        .fetch_optional(&self.pool)
        .await?;
        Ok(transaction)
    }

    async fn mark_done(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(TransactionStatus::Done)
        .bind(TransactionStatus::WaitingConfirmation)
        .fetch_optional(&self.pool)
        .await?;
        Ok(transaction)
    }

    async fn reject_with_refund(&self, id: Uuid) -> Result<Option<Transaction>, AppError> {
        let mut db_tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(TransactionStatus::Rejected)
        .bind(TransactionStatus::WaitingConfirmation)
        .fetch_optional(&mut *db_tx)
        .await?;

        let Some(transaction) = transaction else {
            db_tx.rollback().await?;
            return Ok(None);
        };

        inventory::release(&mut *db_tx, transaction.event_id, transaction.quantity).await?;
        if transaction.points_used > Decimal::ZERO {
            points::credit(&mut *db_tx, transaction.user_id, transaction.points_used).await?;
        }

        db_tx.commit().await?;
        Ok(Some(transaction))
    }

    async fn expire_with_refund(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Transaction>, AppError> {
        let mut db_tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = $3 AND expires_at <= $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(TransactionStatus::Expired)
        .bind(TransactionStatus::WaitingPayment)
        .bind(now)
        .fetch_optional(&mut *db_tx)
        .await?;

        let Some(transaction) = transaction else {
            db_tx.rollback().await?;
            return Ok(None);
        };

        inventory::release(&mut *db_tx, transaction.event_id, transaction.quantity).await?;
        if transaction.points_used > Decimal::ZERO {
            points::credit(&mut *db_tx, transaction.user_id, transaction.points_used).await?;
        }

        db_tx.commit().await?;
        Ok(Some(transaction))
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM transactions WHERE status = $1 AND expires_at <= $2",
        )
        .bind(TransactionStatus::WaitingPayment)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO notifications (user_id, title, message, kind) VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(kind)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
