pub mod availability;
pub mod catalog;
pub mod conversation;
pub mod health;
pub mod notifier;
pub mod retention;
pub mod session_store;
pub mod timezone;
