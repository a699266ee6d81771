use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a booking.
///
/// ```text
/// WAITING_PAYMENT -> WAITING_CONFIRMATION -> DONE | REJECTED
/// WAITING_PAYMENT -> EXPIRED (sweeper, deadline passed)
/// ```
///
/// `Done`, `Rejected` and `Expired` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[sqlx(rename = "WAITING_PAYMENT")]
    WaitingPayment,
    #[sqlx(rename = "WAITING_CONFIRMATION")]
    WaitingConfirmation,
    #[sqlx(rename = "DONE")]
    Done,
    #[sqlx(rename = "REJECTED")]
    Rejected,
    #[sqlx(rename = "EXPIRED")]
    Expired,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Done | TransactionStatus::Rejected | TransactionStatus::Expired
        )
    }

    /// Terminal states in which the reserved seats and spent points have been
    /// returned to their ledgers.
    pub fn is_refunded(self) -> bool {
        matches!(
            self,
            TransactionStatus::Rejected | TransactionStatus::Expired
        )
    }
}

/// A booking moving through the payment lifecycle.
///
/// Price fields are fixed at creation time: `original_price` is
/// `quantity * unit price`, `points_used` is the capped loyalty debit, and
/// `final_price = original_price - points_used` always holds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub original_price: Decimal,
    pub points_used: Decimal,
    pub final_price: Decimal,
    pub status: TransactionStatus,
    pub payment_proof: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!TransactionStatus::WaitingPayment.is_terminal());
        assert!(!TransactionStatus::WaitingConfirmation.is_terminal());
        assert!(TransactionStatus::Done.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
        assert!(TransactionStatus::Expired.is_terminal());
    }

    #[test]
    fn refunded_states_exclude_done() {
        assert!(TransactionStatus::Rejected.is_refunded());
        assert!(TransactionStatus::Expired.is_refunded());
        assert!(!TransactionStatus::Done.is_refunded());
        assert!(!TransactionStatus::WaitingPayment.is_refunded());
    }
}
