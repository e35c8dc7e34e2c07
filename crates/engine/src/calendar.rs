//! Business calendar helpers.
//!
//! "Today" for cash purposes is the operator's calendar day in the configured
//! business timezone, not the server's local day nor UTC.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Guatemala;

/// Business date of `now` in `tz`.
pub fn business_date(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// The `days` calendar days before `today`, oldest first. `today` is excluded.
pub fn previous_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (1..=days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .collect()
}

/// Parses a `YYYY-MM-DD` business date.
pub fn parse_date(raw: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidRequest(format!("invalid date: {raw}")))
}

/// Parses an IANA timezone name (e.g. `America/Guatemala`).
pub fn parse_timezone(raw: &str) -> ResultEngine<Tz> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| EngineError::InvalidRequest(format!("invalid timezone: {raw}")))
}

/// Validates an inclusive date range.
pub(crate) fn ensure_range(from: NaiveDate, to: NaiveDate) -> ResultEngine<()> {
    if from > to {
        return Err(EngineError::InvalidRequest(format!(
            "invalid range: {from} is after {to}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn business_date_follows_timezone() {
        // 03:00 UTC on the 11th is still the 10th in Guatemala (UTC-6).
        let now = Utc.with_ymd_and_hms(2024, 1, 11, 3, 0, 0).unwrap();
        assert_eq!(business_date(DEFAULT_TIMEZONE, now), date(2024, 1, 10));
        assert_eq!(business_date(chrono_tz::UTC, now), date(2024, 1, 11));
    }

    #[test]
    fn previous_days_excludes_today_oldest_first() {
        let days = previous_days(date(2024, 3, 1), 3);
        assert_eq!(days, vec![date(2024, 2, 27), date(2024, 2, 28), date(2024, 2, 29)]);
        assert!(previous_days(date(2024, 3, 1), 0).is_empty());
    }

    #[test]
    fn parse_helpers_reject_garbage() {
        assert_eq!(parse_date("2024-01-10").unwrap(), date(2024, 1, 10));
        assert!(parse_date("10/01/2024").is_err());
        assert_eq!(parse_timezone("America/Guatemala").unwrap(), DEFAULT_TIMEZONE);
        assert!(parse_timezone("Mars/Olympus").is_err());
        assert!(ensure_range(date(2024, 1, 2), date(2024, 1, 1)).is_err());
    }
}
