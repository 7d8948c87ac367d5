//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather pipeline: geocoding, provider fetches, normalization and
//!   daily forecast selection
//! - The persistent search history store
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod history;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod selector;

pub use client::WeatherClient;
pub use config::Config;
pub use error::{Error, Result};
pub use geo::GeoResolver;
pub use history::{HistoryBackend, HistoryStore, JsonFileBackend, MemoryBackend};
pub use model::{Coordinate, ForecastResult, HistoryEntry, WeatherObservation};
pub use normalize::DateStyle;
pub use provider::{OpenWeatherProvider, WeatherProvider, provider_from_config};
