//! Turns raw provider payloads into [`WeatherObservation`]s.
//!
//! Everything here is pure. Dates are rendered with an explicit
//! [`DateStyle`] instead of the host's locale, so the same payload formats
//! identically on every machine.

use chrono::{
    DateTime, FixedOffset,
    format::{Item, StrftimeItems},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::WeatherObservation,
    provider::RawObservation,
};

/// Zero on the Celsius scale, in Kelvin.
const KELVIN_OFFSET: f64 = 273.15;

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    (kelvin - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0
}

/// How observation timestamps become calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateStyle {
    /// Offset from UTC applied before formatting, in minutes.
    pub utc_offset_minutes: i32,
    /// `chrono` strftime pattern.
    pub format: String,
}

impl Default for DateStyle {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            format: "%m/%d/%Y".to_string(),
        }
    }
}

impl DateStyle {
    /// Checks the offset and pattern without formatting anything.
    pub fn validate(&self) -> Result<()> {
        self.offset()?;
        if StrftimeItems::new(&self.format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidInput(format!(
                "invalid date format pattern '{}'",
                self.format
            )));
        }
        Ok(())
    }

    fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "UTC offset of {} minutes is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn format_unix(&self, ts: i64) -> Result<String> {
        self.validate()?;
        let offset = self.offset()?;

        let utc = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
            Error::MalformedPayload(format!("timestamp {ts} is out of range"))
        })?;

        Ok(utc.with_timezone(&offset).format(&self.format).to_string())
    }
}

pub fn normalize(raw: &RawObservation, dates: &DateStyle) -> Result<WeatherObservation> {
    let city = raw
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| missing("name"))?;

    let condition = raw.weather.first().ok_or_else(|| missing("weather[0]"))?;
    let icon = condition.icon.as_deref().ok_or_else(|| missing("weather[0].icon"))?;
    let condition_text = condition
        .description
        .as_deref()
        .ok_or_else(|| missing("weather[0].description"))?;

    let main = raw.main.as_ref().ok_or_else(|| missing("main"))?;
    let kelvin = finite(main.temp, "main.temp")?;
    let humidity = finite(main.humidity, "main.humidity")?;

    let wind_speed = finite(raw.wind.as_ref().and_then(|w| w.speed), "wind.speed")?;

    let ts = raw.dt.ok_or_else(|| missing("dt"))?;

    Ok(WeatherObservation {
        city: city.to_string(),
        date: dates.format_unix(ts)?,
        icon: icon.to_string(),
        condition_text: condition_text.to_string(),
        temperature_f: kelvin_to_fahrenheit(kelvin),
        wind_speed,
        humidity,
    })
}

fn missing(field: &str) -> Error {
    Error::MalformedPayload(format!("missing field `{field}`"))
}

fn finite(value: Option<f64>, field: &str) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(Error::MalformedPayload(format!(
            "field `{field}` is not a finite number: {v}"
        ))),
        None => Err(missing(field)),
    }
}
