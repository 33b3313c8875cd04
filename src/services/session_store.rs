//! Per-user conversation state.
//!
//! Each Telegram user owns at most one [`Session`], keyed by user id and kept
//! in the `booking_sessions` table so an unfinished booking survives a restart.
//! Sessions have no inactivity timeout: `/start` resets one and `/cancel` or a
//! finished booking clears it.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

use crate::database::models::NewBooking;

/// Stored in `booking_sessions.step` as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum Step {
    AwaitingName,
    AwaitingService,
    AwaitingDate,
    AwaitingTime,
    AwaitingPhone,
    Complete,
}

impl Step {
    /// The step that follows a valid answer to this one.
    pub fn next(&self) -> Self {
        match self {
            Step::AwaitingName => Step::AwaitingService,
            Step::AwaitingService => Step::AwaitingDate,
            Step::AwaitingDate => Step::AwaitingTime,
            Step::AwaitingTime => Step::AwaitingPhone,
            Step::AwaitingPhone | Step::Complete => Step::Complete,
        }
    }
}

/// Answers collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl Draft {
    /// `None` if any earlier answer is missing.
    pub fn to_new_booking(&self, phone: &str) -> Option<NewBooking> {
        Some(NewBooking {
            name: self.name.clone()?,
            service: self.service.clone()?,
            date: self.date.clone()?,
            time: self.time.clone()?,
            phone: phone.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub step: Step,
    pub draft: Draft,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            step: Step::AwaitingName,
            draft: Draft::default(),
        }
    }

    /// Moves to the next step and returns the step that was left.
    pub fn advance(&mut self) -> Step {
        let previous = self.step;
        self.step = previous.next();
        previous
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    user_id: i64,
    step: Step,
    name: Option<String>,
    service: Option<String>,
    date: Option<String>,
    time: Option<String>,
}

/// Mapping from user id to that user's [`Session`].
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Starts a fresh session, discarding any unfinished one.
    pub async fn begin(&self, user_id: i64) -> Result<Session, sqlx::Error> {
        let session = Session::new(user_id);
        self.save(&session).await?;
        Ok(session)
    }

    pub async fn load(&self, user_id: i64) -> Result<Option<Session>, sqlx::Error> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT user_id, step, name, service, date, time FROM booking_sessions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;

        let row = match row {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(sqlx::Error::ColumnDecode { index, source }) => {
                tracing::warn!(
                    "Session for user {} has unreadable column {}: {}, discarding it",
                    user_id, index, source
                );
                self.clear(user_id).await?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(Some(Session {
            user_id: row.user_id,
            step: row.step,
            draft: Draft {
                name: row.name,
                service: row.service,
                date: row.date,
                time: row.time,
            },
        }))
    }

    pub async fn save(&self, session: &Session) -> Result<(), sqlx::Error> {
        let updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO booking_sessions (user_id, step, name, service, date, time, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                step = excluded.step,
                name = excluded.name,
                service = excluded.service,
                date = excluded.date,
                time = excluded.time,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session.user_id)
        .bind(session.step)
        .bind(&session.draft.name)
        .bind(&session.draft.service)
        .bind(&session.draft.date)
        .bind(&session.draft.time)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns `false` if the user had no session.
    pub async fn clear(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM booking_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
