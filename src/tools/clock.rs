use chrono::{DateTime, Utc};
use chrono_tz::{TZ_VARIANTS, Tz};
use thiserror::Error;

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Offered back to the model when it asks for a zone that does not exist.
pub const EXAMPLE_TIMEZONES: &[&str] = &[
    "UTC",
    "US/Eastern",
    "US/Pacific",
    "Europe/London",
    "Asia/Tokyo",
    "Australia/Sydney",
];

const DISPLAY_FORMAT: &str = "%A, %B %d, %Y at %I:%M:%S %p %Z";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("Unknown timezone '{0}'. Valid examples: {examples}", examples = EXAMPLE_TIMEZONES.join(", "))]
    UnknownTimezone(String),
}

/// Looks up an IANA zone name, falling back to a case-insensitive match.
pub fn resolve_timezone(name: &str) -> Option<Tz> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    name.parse::<Tz>().ok().or_else(|| {
        TZ_VARIANTS
            .iter()
            .find(|tz| tz.name().eq_ignore_ascii_case(name))
            .copied()
    })
}

pub fn current_time(zone: &str) -> Result<String, ClockError> {
    current_time_at(zone, Utc::now())
}

pub fn current_time_at(zone: &str, now: DateTime<Utc>) -> Result<String, ClockError> {
    let tz = resolve_timezone(zone).ok_or_else(|| ClockError::UnknownTimezone(zone.to_string()))?;
    let local = now.with_timezone(&tz);

    let mut formatted = format!(
        "Current time in {}: {}",
        tz.name(),
        local.format(DISPLAY_FORMAT)
    );
    if local.format("%Z").to_string() != "UTC" {
        formatted.push_str(&format!("\n(UTC: {})", now.format(DISPLAY_FORMAT)));
    }
    Ok(formatted)
}
