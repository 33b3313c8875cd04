//! # Booking Bot
//!
//! A Telegram bot that books salon appointments and forwards each new booking
//! to the owner's WhatsApp.
//!
//! ## Features
//! - Step-by-step booking: name, service, date, time, phone
//! - Overlap check against the service duration, re-checked on insert
//! - Admin commands to list, delete and purge bookings
//! - Polling or secret-guarded webhook delivery
//! - Persistent storage with SQLite

/// Bot commands, update handlers and the webhook endpoint
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database connection, migrations and the booking store
pub mod database;
/// Handler error type
pub mod errors;
/// Booking flow, availability, notifications and background jobs
pub mod services;
/// Utility functions for datetime, validation and logging
pub mod utils;
