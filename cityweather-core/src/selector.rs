//! Picks one representative forecast slot per day.

use crate::provider::RawForecastEntry;

/// Time-of-day component of the slot kept for each day.
pub const REFERENCE_TIME: &str = "12:00:00";

/// Keep the entries whose textual time component equals [`REFERENCE_TIME`],
/// preserving their order. Days without a midday slot are simply absent.
///
/// Works on the provider's raw `dt_txt` string, so the result does not depend
/// on locale or timezone settings.
pub fn select_daily_slots(entries: &[RawForecastEntry]) -> Vec<&RawForecastEntry> {
    entries
        .iter()
        .filter(|entry| {
            entry
                .dt_txt
                .as_deref()
                .and_then(time_of_day)
                .is_some_and(|time| time == REFERENCE_TIME)
        })
        .collect()
}

fn time_of_day(stamp: &str) -> Option<&str> {
    stamp.split_once(' ').map(|(_, time)| time.trim())
}
