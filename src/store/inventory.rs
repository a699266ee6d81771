//! Seat ledger.
//!
//! Single-statement conditional updates so two bookings racing for the last
//! seat serialize inside Postgres: the `WHERE available_seats >= $2`
//! predicate makes the decrement a compare-and-set, and a zero row count
//! means the reservation lost.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::utils::error::AppError;

pub async fn reserve<'e, E>(executor: E, event_id: Uuid, quantity: i32) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE events
        SET available_seats = available_seats - $2, updated_at = now()
        WHERE id = $1 AND available_seats >= $2
        "#,
    )
    .bind(event_id)
    .bind(quantity)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InsufficientSeats);
    }
    Ok(())
}

/// Returns seats to the pool. Capped at `total_seats` so a double release can
/// never mint capacity.
pub async fn release<'e, E>(executor: E, event_id: Uuid, quantity: i32) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE events
        SET available_seats = LEAST(available_seats + $2, total_seats), updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(event_id)
    .bind(quantity)
    .execute(executor)
    .await?;

    Ok(())
}
