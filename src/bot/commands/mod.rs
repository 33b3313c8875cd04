pub mod admin;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Booking bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Book an appointment")]
    Start,
    #[command(description = "Cancel the booking in progress")]
    Cancel,
    #[command(description = "List all bookings (admin)")]
    ViewBookings,
    #[command(description = "Delete a booking by id (admin): /delete <id>")]
    Delete(String),
    #[command(description = "Remove expired bookings (admin)")]
    Clear,
}
