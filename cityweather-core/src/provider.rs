//! Provider boundary: the raw payload shapes and the trait every weather
//! backend implements.
//!
//! Raw types deserialize with every field optional. Deciding whether a payload
//! is usable is the job of [`crate::normalize`], which turns it into a typed
//! observation or a `MalformedPayload` error.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Config, error::Result, model::Coordinate};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// One candidate returned by the geocoding endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoMatch {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub country: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCondition {
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMain {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWind {
    pub speed: Option<f64>,
}

/// Current-conditions payload; forecast entries share the same shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawObservation {
    pub name: Option<String>,
    pub dt: Option<i64>,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    pub main: Option<RawMain>,
    pub wind: Option<RawWind>,
}

/// A forecast slot: an observation tagged with the provider's textual
/// timestamp, e.g. `"2024-01-01 12:00:00"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawForecastEntry {
    #[serde(flatten)]
    pub observation: RawObservation,
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCity {
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawForecast {
    pub city: Option<RawCity>,
    #[serde(default)]
    pub list: Vec<RawForecastEntry>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Look up candidate locations for an already trimmed place name.
    async fn geocode(&self, query: &str) -> Result<Vec<GeoMatch>>;

    async fn current(&self, at: Coordinate) -> Result<RawObservation>;

    /// `Ok(None)` means the provider has no forecast for this location.
    async fn forecast(&self, at: Coordinate) -> Result<Option<RawForecast>>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.require_api_key()?;
    Ok(OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        config.base_url.as_str(),
    ))
}
