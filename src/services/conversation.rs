//! The booking conversation: name → service → date → time → phone.
//!
//! [`BookingFlow`] is transport-agnostic. It takes a user id plus the user's
//! text or button press, advances that user's [`Session`], and returns the
//! [`Reply`] to send back. Invalid answers re-prompt without advancing.

use chrono::{Duration, NaiveTime};
use sqlx::SqlitePool;
use std::sync::Arc;
use teloxide::types::InlineKeyboardMarkup;

use crate::database::models::{Booking, BookingOutcome};
use crate::services::availability;
use crate::services::catalog::service_keyboard;
use crate::services::notifier::Notifier;
use crate::services::session_store::{Session, SessionStore, Step};
use crate::services::timezone::LocalClock;
use crate::utils::datetime::{format_date, format_time};
use crate::utils::logging::{log_database_error, log_step_advanced, log_validation_error};
use crate::utils::validation::{
    validate_date, validate_name, validate_phone, validate_service_choice, validate_time,
};

const GREETING: &str = "👋 Hi! I'm the online booking bot.\nWhat is your name?";
const ASK_SERVICE: &str = "💅 Which service would you like?";
const ASK_DATE: &str = "🗓 Which date would you like? (YYYY-MM-DD)";
const ASK_PHONE: &str = "📱 Enter your phone number (for example, +996123456789):";
const INVALID_NAME: &str = "❌ Please enter a valid name (letters, up to 50 characters).";
const PICK_SERVICE: &str = "💅 Please pick a service using the buttons below.";
const INVALID_DATE: &str = "❌ Date format: 2025-07-10 (today or later).";
const SLOT_TAKEN: &str = "❌ This time is already taken! Please choose another time.";
const INVALID_PHONE: &str = "❌ Invalid phone number. Example: +996123456789";
const NO_SESSION: &str = "Send /start to book an appointment.";
const MENU_EXPIRED: &str = "This menu has expired. Send /start to book an appointment.";
const CANCELLED: &str = "Booking cancelled. Send /start to begin again.";
const INCOMPLETE: &str = "❌ Some answers were missing. Please start again with /start.";
const SLOT_LOST: &str =
    "❌ Sorry, this time was booked by someone else a moment ago. Please start again with /start.";
const SAVE_FAILED: &str = "❌ Failed to save the booking. Please try again later with /start.";

/// Message to send back to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), keyboard: None }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self { text: text.into(), keyboard: Some(keyboard) }
    }
}

/// Business rules applied while collecting a booking.
#[derive(Debug, Clone, Copy)]
pub struct FlowSettings {
    pub service_duration: Duration,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

pub struct BookingFlow {
    pool: SqlitePool,
    sessions: SessionStore,
    settings: FlowSettings,
    clock: LocalClock,
    notifier: Arc<dyn Notifier>,
}

impl BookingFlow {
    pub fn new(
        pool: SqlitePool,
        settings: FlowSettings,
        clock: LocalClock,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(pool.clone()),
            pool,
            settings,
            clock,
            notifier,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// `/start`: (re)starts the conversation from the first question.
    pub async fn start(&self, user_id: i64) -> Result<Reply, sqlx::Error> {
        self.sessions.begin(user_id).await?;
        Ok(Reply::text(GREETING))
    }

    /// `/cancel`: forgets the unfinished booking.
    pub async fn cancel(&self, user_id: i64) -> Result<Reply, sqlx::Error> {
        if self.sessions.clear(user_id).await? {
            Ok(Reply::text(CANCELLED))
        } else {
            Ok(Reply::text(NO_SESSION))
        }
    }

    /// Handles a plain text answer for whatever step the user is on.
    pub async fn handle_text(&self, user_id: i64, text: &str) -> Result<Reply, sqlx::Error> {
        let Some(mut session) = self.sessions.load(user_id).await? else {
            return Ok(Reply::text(NO_SESSION));
        };

        match session.step {
            Step::AwaitingName => self.accept_name(&mut session, text).await,
            Step::AwaitingService => Ok(Reply::with_keyboard(PICK_SERVICE, service_keyboard())),
            Step::AwaitingDate => self.accept_date(&mut session, text).await,
            Step::AwaitingTime => self.accept_time(&mut session, text).await,
            Step::AwaitingPhone => self.accept_phone(&mut session, text).await,
            Step::Complete => {
                // Completed sessions are cleared immediately; a leftover one
                // is stale.
                self.sessions.clear(user_id).await?;
                Ok(Reply::text(NO_SESSION))
            }
        }
    }

    /// Handles a press on the service keyboard.
    pub async fn handle_service_choice(
        &self,
        user_id: i64,
        data: &str,
    ) -> Result<Reply, sqlx::Error> {
        let Some(mut session) = self.sessions.load(user_id).await? else {
            return Ok(Reply::text(MENU_EXPIRED));
        };
        if session.step != Step::AwaitingService {
            return Ok(Reply::text(MENU_EXPIRED));
        }

        match validate_service_choice(data) {
            Ok(service) => {
                session.draft.service = Some(service.label().to_string());
                self.advance_and_save(&mut session).await?;
                Ok(Reply::text(format!("You chose: {}\n\n{}", service.label(), ASK_DATE)))
            }
            Err(e) => {
                log_validation_error("service", data, &e.to_string(), user_id);
                Ok(Reply::with_keyboard(PICK_SERVICE, service_keyboard()))
            }
        }
    }

    async fn accept_name(&self, session: &mut Session, text: &str) -> Result<Reply, sqlx::Error> {
        match validate_name(text) {
            Ok(name) => {
                session.draft.name = Some(name);
                self.advance_and_save(session).await?;
                Ok(Reply::with_keyboard(ASK_SERVICE, service_keyboard()))
            }
            Err(e) => {
                log_validation_error("name", text, &e.to_string(), session.user_id);
                Ok(Reply::text(INVALID_NAME))
            }
        }
    }

    async fn accept_date(&self, session: &mut Session, text: &str) -> Result<Reply, sqlx::Error> {
        match validate_date(text, self.clock.today()) {
            Ok(date) => {
                session.draft.date = Some(format_date(date));
                self.advance_and_save(session).await?;
                Ok(Reply::text(self.ask_time_prompt()))
            }
            Err(e) => {
                log_validation_error("date", text, &e.to_string(), session.user_id);
                Ok(Reply::text(INVALID_DATE))
            }
        }
    }

    async fn accept_time(&self, session: &mut Session, text: &str) -> Result<Reply, sqlx::Error> {
        let time = match validate_time(text, self.settings.opening_time, self.settings.closing_time)
        {
            Ok(time) => format_time(time),
            Err(e) => {
                log_validation_error("time", text, &e.to_string(), session.user_id);
                return Ok(Reply::text(self.invalid_time_prompt()));
            }
        };

        let Some(date) = session.draft.date.clone() else {
            // A time question without a date means the session row was
            // tampered with; restart rather than guess.
            self.sessions.clear(session.user_id).await?;
            return Ok(Reply::text(INCOMPLETE));
        };

        let same_day = Booking::find_by_date(&self.pool, &date).await?;
        if !availability::is_available(&date, &time, &same_day, self.settings.service_duration) {
            log_validation_error("time", text, "slot overlaps an existing booking", session.user_id);
            return Ok(Reply::text(SLOT_TAKEN));
        }

        session.draft.time = Some(time);
        self.advance_and_save(session).await?;
        Ok(Reply::text(ASK_PHONE))
    }

    async fn accept_phone(&self, session: &mut Session, text: &str) -> Result<Reply, sqlx::Error> {
        match validate_phone(text) {
            Ok(phone) => {
                session.advance();
                Ok(self.complete(session, &phone).await)
            }
            Err(e) => {
                log_validation_error("phone", text, &e.to_string(), session.user_id);
                Ok(Reply::text(INVALID_PHONE))
            }
        }
    }

    /// Persists the booking and clears the session whatever the outcome.
    async fn complete(&self, session: &Session, phone: &str) -> Reply {
        let user_id = session.user_id;

        let outcome = match session.draft.to_new_booking(phone) {
            Some(new_booking) => Some(
                Booking::create_if_available(&self.pool, &new_booking, self.settings.service_duration)
                    .await,
            ),
            None => None,
        };

        if let Err(e) = self.sessions.clear(user_id).await {
            log_database_error("DELETE", "booking_sessions", &e.to_string(), None);
        }

        match outcome {
            None => Reply::text(INCOMPLETE),
            Some(Ok(BookingOutcome::Created(booking))) => {
                tracing::info!(
                    "Booking {} created for user {} on {} at {}",
                    booking.id, user_id, booking.date, booking.time
                );
                if let Err(e) = self.notifier.notify(&booking).await {
                    tracing::warn!("Failed to forward booking {}: {:#}", booking.id, e);
                }
                Reply::text(confirmation_text(&booking))
            }
            Some(Ok(BookingOutcome::SlotTaken)) => Reply::text(SLOT_LOST),
            Some(Err(e)) => {
                log_database_error("INSERT", "appointments", &e.to_string(), Some(&format!("user {user_id}")));
                Reply::text(SAVE_FAILED)
            }
        }
    }

    async fn advance_and_save(&self, session: &mut Session) -> Result<(), sqlx::Error> {
        let previous = session.advance();
        self.sessions.save(session).await?;
        log_step_advanced(previous, session.step, session.user_id);
        Ok(())
    }

    fn ask_time_prompt(&self) -> String {
        format!(
            "🕒 What time? (for example, 14:30, between {} and {})",
            format_time(self.settings.opening_time),
            format_time(self.settings.closing_time)
        )
    }

    fn invalid_time_prompt(&self) -> String {
        format!(
            "❌ Time format: 14:30, between {} and {}.",
            format_time(self.settings.opening_time),
            format_time(self.settings.closing_time)
        )
    }
}

pub fn confirmation_text(booking: &Booking) -> String {
    format!(
        "✅ Booking confirmed!\n\nID: {}\nName: {}\nService: {}\nDate: {}\nTime: {}\nPhone: {}",
        booking.id, booking.name, booking.service, booking.date, booking.time, booking.phone
    )
}
