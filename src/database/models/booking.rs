use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use std::time::Duration as StdDuration;

use crate::services::availability;
use crate::utils::datetime::format_date;

const SELECT_BOOKINGS: &str =
    "SELECT id, name, service, date, time, phone, created_at FROM appointments";

const LOCK_RETRIES: u32 = 3;
const LOCK_RETRY_DELAY: StdDuration = StdDuration::from_millis(200);

/// One confirmed appointment.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub name: String,
    pub service: String,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM
    pub phone: String,
    pub created_at: String,
}

/// A validated booking that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub name: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Created(Booking),
    /// Another booking on the same date overlaps the requested slot.
    SlotTaken,
}

impl Booking {
    /// Inserts without any availability check.
    pub async fn create(pool: &SqlitePool, new: &NewBooking) -> Result<Self, sqlx::Error> {
        insert(pool, new).await
    }

    /// Checks availability and inserts inside one transaction.
    ///
    /// SQLite allows a single writer, so two users racing for the same slot
    /// cannot both commit: the loser gets a lock error, is retried, and then
    /// sees the winner's row during the re-check.
    pub async fn create_if_available(
        pool: &SqlitePool,
        new: &NewBooking,
        service_duration: Duration,
    ) -> Result<BookingOutcome, sqlx::Error> {
        let mut attempt = 1;
        loop {
            match try_create_if_available(pool, new, service_duration).await {
                Err(e) if is_unique_violation(&e) => return Ok(BookingOutcome::SlotTaken),
                Err(e) if attempt < LOCK_RETRIES && is_lock_contention(&e) => {
                    tracing::warn!(
                        "Checked insert for {} {} hit lock contention (attempt {}/{}): {}",
                        new.date, new.time, attempt, LOCK_RETRIES, e
                    );
                    tokio::time::sleep(LOCK_RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!("{SELECT_BOOKINGS} ORDER BY date, time, id"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_date(pool: &SqlitePool, date: &str) -> Result<Vec<Self>, sqlx::Error> {
        fetch_by_date(pool, date).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!("{SELECT_BOOKINGS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Returns `false` when no booking has this id.
    pub async fn delete_by_id(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every booking dated strictly before `cutoff`.
    pub async fn delete_before(pool: &SqlitePool, cutoff: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE date < ?")
            .bind(format_date(cutoff))
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments")
            .fetch_one(pool)
            .await
    }
}

async fn try_create_if_available(
    pool: &SqlitePool,
    new: &NewBooking,
    service_duration: Duration,
) -> Result<BookingOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let same_day = fetch_by_date(&mut *tx, &new.date).await?;
    if !availability::is_available(&new.date, &new.time, &same_day, service_duration) {
        tx.rollback().await?;
        return Ok(BookingOutcome::SlotTaken);
    }

    let booking = insert(&mut *tx, new).await?;
    tx.commit().await?;

    Ok(BookingOutcome::Created(booking))
}

async fn fetch_by_date<'e, E>(executor: E, date: &str) -> Result<Vec<Booking>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Booking>(&format!("{SELECT_BOOKINGS} WHERE date = ? ORDER BY time"))
        .bind(date)
        .fetch_all(executor)
        .await
}

async fn insert<'e, E>(executor: E, new: &NewBooking) -> Result<Booking, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created_at = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO appointments (name, service, date, time, phone, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.name)
    .bind(&new.service)
    .bind(&new.date)
    .bind(&new.time)
    .bind(&new.phone)
    .bind(&created_at)
    .execute(executor)
    .await?;

    Ok(Booking {
        id: result.last_insert_rowid(),
        name: new.name.clone(),
        service: new.service.clone(),
        date: new.date.clone(),
        time: new.time.clone(),
        phone: new.phone.clone(),
        created_at,
    })
}

fn is_lock_contention(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            let message = db_error.message().to_lowercase();
            message.contains("locked") || message.contains("busy")
        }
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}
