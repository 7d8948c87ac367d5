use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Both components must be finite; anything else is rejected.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(Error::InvalidInput(format!(
                "coordinates must be finite numbers, got ({latitude}, {longitude})"
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

/// One normalized weather reading: current conditions or a single forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    pub city: String,
    pub date: String,
    pub icon: String,
    pub condition_text: String,
    pub temperature_f: f64,
    /// Metres per second, as reported by the provider.
    pub wind_speed: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

/// Current conditions followed by one observation per forecast day.
///
/// Never empty: the first element is always the current conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForecastResult {
    observations: Vec<WeatherObservation>,
}

impl ForecastResult {
    pub fn new(current: WeatherObservation, days: Vec<WeatherObservation>) -> Self {
        let mut observations = Vec::with_capacity(days.len() + 1);
        observations.push(current);
        observations.extend(days);
        Self { observations }
    }

    pub fn current(&self) -> &WeatherObservation {
        &self.observations[0]
    }

    pub fn days(&self) -> &[WeatherObservation] {
        &self.observations[1..]
    }

    pub fn observations(&self) -> &[WeatherObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_observations(self) -> Vec<WeatherObservation> {
        self.observations
    }
}

/// A previously searched place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
}
