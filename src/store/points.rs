//! Loyalty points ledger.
//!
//! Same compare-and-set shape as the seat ledger: a debit only lands when the
//! balance covers it, so concurrent debits on one user cannot drive the
//! balance negative. Credits are unconditional.

use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::utils::error::AppError;

pub async fn debit<'e, E>(executor: E, user_id: Uuid, amount: Decimal) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users
        SET points = points - $2, updated_at = now()
        WHERE id = $1 AND points >= $2
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InsufficientPoints);
    }
    Ok(())
}

pub async fn credit<'e, E>(executor: E, user_id: Uuid, amount: Decimal) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE users
        SET points = points + $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(executor)
    .await?;

    Ok(())
}
