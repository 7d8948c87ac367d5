use crate::{
    error::{Error, Result},
    model::Coordinate,
    provider::WeatherProvider,
};

/// Resolves free-text place names to coordinates through a provider's
/// geocoding endpoint.
#[derive(Debug)]
pub struct GeoResolver<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P: WeatherProvider + ?Sized> GeoResolver<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// The first match wins; further candidates are not disambiguated.
    pub async fn resolve(&self, place_name: &str) -> Result<Coordinate> {
        let query = place_name.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("city name cannot be blank".to_string()));
        }

        let matches = self.provider.geocode(query).await?;
        let Some(first) = matches.first() else {
            return Err(Error::NotFound(query.to_string()));
        };

        tracing::debug!(
            query,
            candidates = matches.len(),
            name = first.name.as_deref().unwrap_or("?"),
            country = first.country.as_deref().unwrap_or("?"),
            "geocoded place name"
        );

        match (first.lat, first.lon) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
                .map_err(|_| invalid_coordinates(query, Some(lat), Some(lon))),
            (lat, lon) => Err(invalid_coordinates(query, lat, lon)),
        }
    }
}

fn invalid_coordinates(query: &str, lat: Option<f64>, lon: Option<f64>) -> Error {
    Error::MalformedPayload(format!(
        "geocoding result for '{query}' has invalid coordinates (lat: {lat:?}, lon: {lon:?})"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GeoMatch, RawForecast, RawObservation};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        matches: Vec<GeoMatch>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WeatherProvider for FakeGeocoder {
        async fn geocode(&self, query: &str) -> Result<Vec<GeoMatch>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.matches.clone())
        }

        async fn current(&self, _at: Coordinate) -> Result<RawObservation> {
            unreachable!("geocoding tests never fetch weather")
        }

        async fn forecast(&self, _at: Coordinate) -> Result<Option<RawForecast>> {
            unreachable!("geocoding tests never fetch weather")
        }
    }

    fn at(lat: f64, lon: f64) -> GeoMatch {
        GeoMatch {
            lat: Some(lat),
            lon: Some(lon),
            ..GeoMatch::default()
        }
    }

    #[tokio::test]
    async fn blank_name_fails_before_any_request() {
        let provider = FakeGeocoder::default();
        let err = GeoResolver::new(&provider).resolve("   ").await.unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(provider.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_matches_is_not_found() {
        let provider = FakeGeocoder::default();
        let err = GeoResolver::new(&provider).resolve("Atlantis").await.unwrap_err();

        assert!(matches!(err, Error::NotFound(ref q) if q == "Atlantis"));
    }

    #[tokio::test]
    async fn first_match_wins_and_query_is_trimmed() {
        let provider = FakeGeocoder {
            matches: vec![at(51.5, -0.12), at(42.98, -81.24)],
            ..FakeGeocoder::default()
        };

        let coord = GeoResolver::new(&provider).resolve("  London ").await.unwrap();

        assert_eq!(coord, Coordinate { latitude: 51.5, longitude: -0.12 });
        assert_eq!(*provider.queries.lock().unwrap(), ["London"]);
    }

    #[tokio::test]
    async fn missing_latitude_is_an_upstream_failure() {
        let provider = FakeGeocoder {
            matches: vec![GeoMatch {
                lon: Some(2.35),
                ..GeoMatch::default()
            }],
            ..FakeGeocoder::default()
        };

        let err = GeoResolver::new(&provider).resolve("Paris").await.unwrap_err();
        assert!(err.is_upstream());
    }
}
