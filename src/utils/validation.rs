use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::services::catalog::{Service, SERVICE_CALLBACK_PREFIX};
use crate::utils::datetime::{parse_date, parse_time};

pub const MAX_NAME_LENGTH: usize = 50;

// Kyrgyz mobile numbers: +996 followed by nine digits.
#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+996[0-9]{9}$").expect("phone pattern is valid"));

/// Returns the trimmed name.
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Name cannot be empty"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(anyhow!("Name cannot be longer than {} characters", MAX_NAME_LENGTH));
    }

    if !name.chars().any(char::is_alphabetic) {
        return Err(anyhow!("Name must contain at least one letter"));
    }

    Ok(name.to_string())
}

/// Parses `svc_<index>` callback data into a catalog entry.
pub fn validate_service_choice(data: &str) -> Result<Service> {
    let index = data
        .strip_prefix(SERVICE_CALLBACK_PREFIX)
        .ok_or_else(|| anyhow!("Unexpected callback data '{}'", data))?;

    let index: usize = index
        .parse()
        .map_err(|_| anyhow!("Service index '{}' is not a number", index))?;

    Service::from_index(index).ok_or_else(|| anyhow!("No service with index {}", index))
}

/// Accepts `YYYY-MM-DD` dates that are not before `today`.
pub fn validate_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let date = parse_date(input).ok_or_else(|| anyhow!("Date must look like 2025-07-10"))?;

    if date < today {
        return Err(anyhow!("Date {} is in the past", date));
    }

    Ok(date)
}

/// Accepts `HH:MM` start times between `opening` and `closing`, inclusive.
pub fn validate_time(input: &str, opening: NaiveTime, closing: NaiveTime) -> Result<NaiveTime> {
    let input = input.trim();

    // Only the strict HH:MM form is accepted from users; stored values are
    // normalized more leniently by the availability check.
    if input.len() != 5 {
        return Err(anyhow!("Time must look like 14:30"));
    }
    let time = parse_time(input).ok_or_else(|| anyhow!("Time must look like 14:30"))?;

    if time < opening || time > closing {
        return Err(anyhow!(
            "Time {} is outside business hours {}-{}",
            time.format("%H:%M"),
            opening.format("%H:%M"),
            closing.format("%H:%M")
        ));
    }

    Ok(time)
}

/// Returns the trimmed phone number.
pub fn validate_phone(phone: &str) -> Result<String> {
    let phone = phone.trim();

    if !PHONE_PATTERN.is_match(phone) {
        return Err(anyhow!("Phone number must look like +996123456789"));
    }

    Ok(phone.to_string())
}
