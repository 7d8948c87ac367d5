use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    error::{Error, Result},
    model::Coordinate,
};

use super::{GeoMatch, RawForecast, RawObservation, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const GEOCODE_LIMIT: &str = "5";

/// OpenWeather client. Requests use the provider's standard units, so
/// temperatures arrive in Kelvin and wind speed in metres per second.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Every non-success status, 404 included, is an `UpstreamStatus` error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        // `query` percent-encodes every value, including the place name.
        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Failed to send OpenWeather {what} request"), e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            Error::upstream(format!("Failed to read OpenWeather {what} response body"), e)
        })?;

        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::MalformedPayload(format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, query: &str) -> Result<Vec<GeoMatch>> {
        self.get_json("geocoding", GEOCODE_PATH, &[("q", query), ("limit", GEOCODE_LIMIT)])
            .await
    }

    async fn current(&self, at: Coordinate) -> Result<RawObservation> {
        let (lat, lon) = (at.latitude.to_string(), at.longitude.to_string());

        self.get_json(
            "current weather",
            CURRENT_PATH,
            &[("lat", lat.as_str()), ("lon", lon.as_str())],
        )
        .await
    }

    /// A 404 from the forecast endpoint means no forecast for this location.
    async fn forecast(&self, at: Coordinate) -> Result<Option<RawForecast>> {
        let (lat, lon) = (at.latitude.to_string(), at.longitude.to_string());

        let result: Result<RawForecast> = self
            .get_json("forecast", FORECAST_PATH, &[("lat", lat.as_str()), ("lon", lon.as_str())])
            .await;

        match result {
            Ok(forecast) => Ok(Some(fill_entry_names(forecast))),
            Err(Error::UpstreamStatus { status, .. }) if status == StatusCode::NOT_FOUND => {
                tracing::debug!(%lat, %lon, "OpenWeather has no forecast for location");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Forecast slots carry no place name of their own; borrow the city block's.
fn fill_entry_names(mut forecast: RawForecast) -> RawForecast {
    let city_name = forecast.city.as_ref().and_then(|c| c.name.clone());

    if let Some(city_name) = city_name {
        for entry in &mut forecast.list {
            entry
                .observation
                .name
                .get_or_insert_with(|| city_name.clone());
        }
    }

    forecast
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
