use crate::error::SkycastError;
use crate::model::{AirPollution, Coordinates, CurrentWeather, Forecast, Place};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The five endpoint kinds the dashboard talks to. Used for error reporting
/// and logging so a failure names the fetch that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Geocode,
    ReverseGeocode,
    CurrentWeather,
    AirPollution,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Geocode => "geocode",
            Endpoint::ReverseGeocode => "reverse-geocode",
            Endpoint::CurrentWeather => "current-weather",
            Endpoint::AirPollution => "air-pollution",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway to the remote weather API.
///
/// The orchestrator only sees this trait; [`openweather::OpenWeatherClient`]
/// is the production implementation and tests substitute their own.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn current_weather(&self, coords: Coordinates) -> Result<CurrentWeather, SkycastError>;

    async fn air_pollution(&self, coords: Coordinates) -> Result<AirPollution, SkycastError>;

    async fn forecast(&self, coords: Coordinates) -> Result<Forecast, SkycastError>;

    /// Up to five places matching a free-text query. An empty result is not
    /// an error here; callers decide how to present it.
    async fn geocode(&self, query: &str) -> Result<Vec<Place>, SkycastError>;

    /// Nearest named place for a pair of coordinates, if any.
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<Place>, SkycastError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_names_are_distinct() {
        let all = [
            Endpoint::Geocode,
            Endpoint::ReverseGeocode,
            Endpoint::CurrentWeather,
            Endpoint::AirPollution,
            Endpoint::Forecast,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }
}
