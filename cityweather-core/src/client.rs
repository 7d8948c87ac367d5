use crate::{
    error::Result,
    geo::GeoResolver,
    model::ForecastResult,
    normalize::{DateStyle, normalize},
    provider::WeatherProvider,
    selector::select_daily_slots,
};

/// Aggregates geocoding, current conditions and the daily forecast for a
/// place name.
///
/// Holds no per-query state, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct WeatherClient<P> {
    provider: P,
    dates: DateStyle,
}

impl<P: WeatherProvider> WeatherClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            dates: DateStyle::default(),
        }
    }

    /// Fails with `InvalidInput` when `dates` has an out-of-range offset or
    /// an invalid pattern, before any request is made.
    pub fn with_date_style(provider: P, dates: DateStyle) -> Result<Self> {
        dates.validate()?;
        Ok(Self { provider, dates })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs geocode, current fetch and forecast fetch in sequence.
    ///
    /// Any failure aborts the query. An empty or absent forecast is not a
    /// failure: the result then holds only the current conditions.
    #[tracing::instrument(skip(self))]
    pub async fn get_weather_for_city(&self, place_name: &str) -> Result<ForecastResult> {
        let coord = GeoResolver::new(&self.provider).resolve(place_name).await?;
        tracing::debug!(lat = coord.latitude, lon = coord.longitude, "resolved coordinates");

        let raw_current = self.provider.current(coord).await?;
        let current = normalize(&raw_current, &self.dates)?;

        let forecast = self.provider.forecast(coord).await?;
        let entries = match forecast {
            Some(f) if !f.list.is_empty() => f.list,
            _ => {
                tracing::warn!(city = %current.city, "no forecast available, returning current conditions only");
                return Ok(ForecastResult::new(current, Vec::new()));
            }
        };

        let selected = select_daily_slots(&entries);
        tracing::debug!(slots = entries.len(), days = selected.len(), "selected daily forecast slots");

        let days = selected
            .into_iter()
            .map(|entry| {
                if entry.observation.name.is_some() {
                    normalize(&entry.observation, &self.dates)
                } else {
                    let mut observation = entry.observation.clone();
                    observation.name = Some(current.city.clone());
                    normalize(&observation, &self.dates)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(city = %current.city, days = days.len(), "weather retrieved");
        Ok(ForecastResult::new(current, days))
    }
}
