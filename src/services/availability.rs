//! Overlap detection between a requested slot and existing bookings.
//!
//! Every booking occupies `[start, start + service_duration)`. Two bookings
//! conflict when their intervals intersect. Only bookings on the requested
//! day are compared; among those, an unreadable start time counts as a
//! conflict, as does an unreadable request.

use chrono::{Duration, NaiveDateTime};

use crate::database::models::Booking;
use crate::utils::datetime::{parse_date, parse_date_time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn starting_at(start: NaiveDateTime, duration: Duration) -> Self {
        Self { start, end: start + duration }
    }

    /// Half-open intervals: touching end-to-start is not an overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Returns `true` when `date`/`time` can be booked.
pub fn is_available(date: &str, time: &str, existing: &[Booking], duration: Duration) -> bool {
    match check(date, time, existing, duration) {
        Ok(conflict) => conflict.is_none(),
        Err(()) => false,
    }
}

/// Returns the first booking that blocks the requested slot.
///
/// An unparseable candidate yields `None`; use [`is_available`] for the
/// fail-safe answer.
pub fn find_conflict<'a>(
    date: &str,
    time: &str,
    existing: &'a [Booking],
    duration: Duration,
) -> Option<&'a Booking> {
    check(date, time, existing, duration).ok().flatten()
}

fn check<'a>(
    date: &str,
    time: &str,
    existing: &'a [Booking],
    duration: Duration,
) -> Result<Option<&'a Booking>, ()> {
    let requested_day = parse_date(date).ok_or(())?;
    let requested = Interval::starting_at(parse_date_time(date, time).ok_or(())?, duration);

    for booking in existing {
        if parse_date(&booking.date) != Some(requested_day) {
            continue;
        }

        let Some(start) = parse_date_time(&booking.date, &booking.time) else {
            tracing::warn!(
                "Booking {} has unreadable date/time '{} {}', treating slot as taken",
                booking.id, booking.date, booking.time
            );
            return Ok(Some(booking));
        };

        if requested.overlaps(&Interval::starting_at(start, duration)) {
            return Ok(Some(booking));
        }
    }

    Ok(None)
}
