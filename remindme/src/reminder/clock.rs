//! Parsing of reminder time expressions into absolute local deadlines.
//!
//! Two forms are accepted: a relative offset such as `25m`, and a
//! 24-hour clock time such as `15:04`. Both resolve against a caller
//! supplied `now` so the results stay deterministic under test.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveTime};

use crate::reminder::error::ParseError;

/// Parse a relative duration (`30s`, `25m`, `2h`) into a deadline
/// offset from `now`.
///
/// The amount is a signed integer; `-5m` resolves to five minutes ago
/// and will fire on the next sweep.
pub fn parse_relative(input: &str, now: DateTime<Local>) -> Result<DateTime<Local>, ParseError> {
    let err = || ParseError::duration(input);

    let unit = input.chars().last().ok_or_else(err)?;
    let amount: i64 = input[..input.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| err())?;

    let offset = match unit {
        's' => Duration::try_seconds(amount),
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        _ => None,
    }
    .ok_or_else(err)?;

    now.checked_add_signed(offset).ok_or_else(err)
}

/// Parse a 24-hour `HH:MM` clock time into a deadline on today's date.
///
/// A time earlier than `now` stays on today's date; it comes due
/// immediately on the next sweep rather than rolling to tomorrow.
pub fn parse_clock(input: &str, now: DateTime<Local>) -> Result<DateTime<Local>, ParseError> {
    let err = || ParseError::clock(input);

    let time = NaiveTime::parse_from_str(input, "%H:%M").map_err(|_| err())?;
    let naive = now.date_naive().and_time(time);

    match naive.and_local_timezone(Local) {
        LocalResult::Single(deadline) => Ok(deadline),
        // A clock rolled back by DST names two instants; take the first.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        // A time skipped by DST resolves to the hour after the gap.
        LocalResult::None => (naive + Duration::hours(1))
            .and_local_timezone(Local)
            .earliest()
            .ok_or_else(err),
    }
}
