use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// Parses a wall-clock time, tolerating a trailing seconds component
/// (`14:30:00`) and single-digit hours (`9:30`). Seconds are dropped.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    let mut parts = input.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute_part = parts.next()?;
    if minute_part.len() != 2 {
        return None;
    }
    let minute: u32 = minute_part.parse().ok()?;

    match parts.next() {
        None => {}
        Some(seconds) if seconds.len() == 2 && seconds.parse::<u32>().is_ok_and(|s| s < 60) => {}
        Some(_) => return None,
    }
    if parts.next().is_some() {
        return None;
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn parse_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    Some(parse_date(date)?.and_time(parse_time(time)?))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
