use sqlx::SqlitePool;

use crate::database::models::Booking;
use crate::services::retention::RetentionPolicy;
use crate::utils::datetime::format_date;
use crate::utils::logging::{log_access_denied, log_system_event};

const ACCESS_DENIED: &str = "⛔ Access denied.";
const NO_BOOKINGS: &str = "📭 No bookings.";
const DELETE_USAGE: &str = "Usage: /delete <id>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    ViewBookings,
    Delete(String),
    Clear,
}

impl AdminAction {
    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::ViewBookings => "/viewbookings",
            AdminAction::Delete(_) => "/delete",
            AdminAction::Clear => "/clear",
        }
    }
}

/// Commands reserved for the salon owner.
pub struct AdminConsole {
    pool: SqlitePool,
    admin_user_id: u64,
    retention: RetentionPolicy,
}

impl AdminConsole {
    pub fn new(pool: SqlitePool, admin_user_id: u64, retention: RetentionPolicy) -> Self {
        Self {
            pool,
            admin_user_id,
            retention,
        }
    }

    /// An id of 0 means no one is admin.
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_user_id != 0 && user_id == self.admin_user_id
    }

    /// Runs `action` for `user_id` and returns the text to send back.
    pub async fn run(&self, user_id: u64, action: AdminAction) -> Result<String, sqlx::Error> {
        if !self.is_admin(user_id) {
            log_access_denied(action.name(), user_id as i64);
            return Ok(ACCESS_DENIED.to_string());
        }

        match action {
            AdminAction::ViewBookings => {
                let bookings = Booking::find_all(&self.pool).await?;
                Ok(render_bookings(&bookings))
            }
            AdminAction::Delete(argument) => self.delete(argument.trim()).await,
            AdminAction::Clear => {
                let report = self.retention.purge(&self.pool).await?;
                let cutoff = format_date(report.cutoff);
                log_system_event(
                    "Bookings cleared by admin",
                    Some(&format!("{} removed, cutoff {}", report.removed, cutoff)),
                );
                Ok(format!(
                    "🧹 Removed {} booking(s) dated before {}.",
                    report.removed, cutoff
                ))
            }
        }
    }

    async fn delete(&self, argument: &str) -> Result<String, sqlx::Error> {
        let Ok(id) = argument.parse::<i64>() else {
            return Ok(DELETE_USAGE.to_string());
        };

        if Booking::delete_by_id(&self.pool, id).await? {
            log_system_event("Booking deleted by admin", Some(&format!("id {id}")));
            Ok(format!("✅ Deleted: {id}"))
        } else {
            Ok(format!("❌ Booking {id} not found."))
        }
    }
}

pub fn render_bookings(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return NO_BOOKINGS.to_string();
    }

    let mut text = format!("📋 Bookings ({}):\n", bookings.len());
    for booking in bookings {
        text.push_str(&format!(
            "\nID: {}\n👤 {}\n💅 {}\n🗓 {} {}\n📱 {}\n",
            booking.id, booking.name, booking.service, booking.date, booking.time, booking.phone
        ));
    }
    text
}
