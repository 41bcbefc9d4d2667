//! OpenWeather HTTP gateway.
//!
//! One URL builder per endpoint kind, all pure and deterministic, plus a
//! single fetch path: GET, status check, JSON decode, shape validation,
//! conversion to the domain types in [`crate::model`]. No retries and no
//! caching; every request is bounded by the client timeout so a dead
//! upstream surfaces as [`SkycastError::Timeout`] instead of hanging the
//! dashboard.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::SkycastError;
use crate::model::{AirPollution, Coordinates, CurrentWeather, Forecast, ForecastEntry, Place};
use crate::provider::{Endpoint, WeatherApi};
use crate::validate::{is_valid_air_pollution, is_valid_current_weather, is_valid_forecast};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How many geocode matches a free-text search asks for.
const GEOCODE_LIMIT: &str = "5";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self, SkycastError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different host. Used by tests against a stub
    /// server; also handy for API-compatible proxies.
    pub fn with_base_url(
        api_key: String,
        base_url: impl Into<String>,
    ) -> Result<Self, SkycastError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SkycastError::Client)?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build a client from the stored configuration (env var wins over the
    /// config file).
    pub fn from_config(config: &Config) -> Result<Self, SkycastError> {
        let api_key = config.resolved_api_key().ok_or(SkycastError::MissingApiKey)?;
        Self::new(api_key)
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            query.append_pair(key, value);
        }
        query.append_pair("appid", &self.api_key);
        format!("{}{}?{}", self.base_url, path, query.finish())
    }

    pub fn geocode_url(&self, query: &str) -> String {
        self.build_url("/geo/1.0/direct", &[("q", query), ("limit", GEOCODE_LIMIT)])
    }

    pub fn reverse_geocode_url(&self, coords: Coordinates) -> String {
        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        self.build_url(
            "/geo/1.0/reverse",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("limit", GEOCODE_LIMIT),
            ],
        )
    }

    pub fn current_weather_url(&self, coords: Coordinates) -> String {
        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        self.build_url(
            "/data/2.5/weather",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
            ],
        )
    }

    pub fn air_pollution_url(&self, coords: Coordinates) -> String {
        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        self.build_url(
            "/data/2.5/air_pollution",
            &[("lat", lat.as_str()), ("lon", lon.as_str())],
        )
    }

    pub fn forecast_url(&self, coords: Coordinates) -> String {
        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        self.build_url(
            "/data/2.5/forecast",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
            ],
        )
    }

    /// GET an endpoint and decode the body to a JSON value. Non-2xx statuses
    /// and transport failures become typed errors; shape checks happen in
    /// the typed fetchers below.
    async fn fetch_value(&self, endpoint: Endpoint, url: String) -> Result<Value, SkycastError> {
        debug!(%endpoint, "issuing request");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SkycastError::from_reqwest(endpoint, e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(SkycastError::Status { endpoint, status });
        }

        let body = res
            .text()
            .await
            .map_err(|e| SkycastError::from_reqwest(endpoint, e))?;

        serde_json::from_str(&body).map_err(|source| SkycastError::Decode { endpoint, source })
    }

    async fn fetch_current_weather(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentWeather, SkycastError> {
        let endpoint = Endpoint::CurrentWeather;
        let value = self
            .fetch_value(endpoint, self.current_weather_url(coords))
            .await?;

        if !is_valid_current_weather(&value) {
            return Err(SkycastError::UnexpectedShape { endpoint });
        }

        let parsed: OwCurrentResponse = serde_json::from_value(value)
            .map_err(|source| SkycastError::Decode { endpoint, source })?;

        Ok(parsed.into_domain())
    }

    async fn fetch_air_pollution(
        &self,
        coords: Coordinates,
    ) -> Result<AirPollution, SkycastError> {
        let endpoint = Endpoint::AirPollution;
        let value = self
            .fetch_value(endpoint, self.air_pollution_url(coords))
            .await?;

        if !is_valid_air_pollution(&value) {
            return Err(SkycastError::UnexpectedShape { endpoint });
        }

        let parsed: OwAirPollutionResponse = serde_json::from_value(value)
            .map_err(|source| SkycastError::Decode { endpoint, source })?;

        parsed
            .into_domain()
            .ok_or(SkycastError::UnexpectedShape { endpoint })
    }

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<Forecast, SkycastError> {
        let endpoint = Endpoint::Forecast;
        let value = self.fetch_value(endpoint, self.forecast_url(coords)).await?;

        if !is_valid_forecast(&value) {
            return Err(SkycastError::UnexpectedShape { endpoint });
        }

        let parsed: OwForecastResponse = serde_json::from_value(value)
            .map_err(|source| SkycastError::Decode { endpoint, source })?;

        Ok(parsed.into_domain())
    }

    async fn fetch_geocode(&self, query: &str) -> Result<Vec<Place>, SkycastError> {
        let endpoint = Endpoint::Geocode;
        let value = self.fetch_value(endpoint, self.geocode_url(query)).await?;

        let parsed: Vec<OwGeoPlace> = serde_json::from_value(value)
            .map_err(|source| SkycastError::Decode { endpoint, source })?;

        Ok(parsed.into_iter().map(OwGeoPlace::into_domain).collect())
    }

    async fn fetch_reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> Result<Option<Place>, SkycastError> {
        let endpoint = Endpoint::ReverseGeocode;
        let value = self
            .fetch_value(endpoint, self.reverse_geocode_url(coords))
            .await?;

        let parsed: Vec<OwGeoPlace> = serde_json::from_value(value)
            .map_err(|source| SkycastError::Decode { endpoint, source })?;

        Ok(parsed.into_iter().next().map(OwGeoPlace::into_domain))
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn current_weather(&self, coords: Coordinates) -> Result<CurrentWeather, SkycastError> {
        self.fetch_current_weather(coords).await
    }

    async fn air_pollution(&self, coords: Coordinates) -> Result<AirPollution, SkycastError> {
        self.fetch_air_pollution(coords).await
    }

    async fn forecast(&self, coords: Coordinates) -> Result<Forecast, SkycastError> {
        self.fetch_forecast(coords).await
    }

    async fn geocode(&self, query: &str) -> Result<Vec<Place>, SkycastError> {
        self.fetch_geocode(query).await
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<Place>, SkycastError> {
        self.fetch_reverse_geocode(coords).await
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    timezone: i32,
    #[serde(default)]
    visibility: f64,
    main: OwMain,
    weather: Vec<OwWeather>,
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_domain(self) -> CurrentWeather {
        let (description, icon) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), "01d".to_string()));

        CurrentWeather {
            description,
            icon,
            observed_at: self.dt,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            pressure_hpa: self.main.pressure,
            humidity_pct: self.main.humidity,
            visibility_m: self.visibility,
            timezone_offset: self.timezone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwAqiMain {
    aqi: u8,
}

#[derive(Debug, Deserialize, Default)]
struct OwComponents {
    #[serde(default)]
    no2: f64,
    #[serde(default)]
    o3: f64,
    #[serde(default)]
    so2: f64,
    #[serde(default)]
    pm2_5: f64,
}

#[derive(Debug, Deserialize)]
struct OwAqiEntry {
    main: OwAqiMain,
    #[serde(default)]
    components: OwComponents,
}

#[derive(Debug, Deserialize)]
struct OwAirPollutionResponse {
    list: Vec<OwAqiEntry>,
}

impl OwAirPollutionResponse {
    fn into_domain(self) -> Option<AirPollution> {
        let entry = self.list.into_iter().next()?;
        Some(AirPollution {
            aqi: entry.main.aqi,
            no2: entry.components.no2,
            o3: entry.components.o3,
            so2: entry.components.so2,
            pm2_5: entry.components.pm2_5,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwWind {
    #[serde(default)]
    deg: f64,
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl OwForecastResponse {
    fn into_domain(self) -> Forecast {
        let timezone_offset = self.city.timezone;
        let entries = self
            .list
            .into_iter()
            .map(|entry| {
                let (description, icon) = entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| (w.description, w.icon))
                    .unwrap_or_else(|| ("Unknown".to_string(), "01d".to_string()));

                ForecastEntry {
                    dt: entry.dt,
                    temperature_c: entry.main.temp,
                    description,
                    icon,
                    wind_deg: entry.wind.deg.rem_euclid(360.0) as u16,
                    wind_speed_mps: entry.wind.speed,
                }
            })
            .collect();

        Forecast {
            entries,
            timezone_offset,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoPlace {
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl OwGeoPlace {
    fn into_domain(self) -> Place {
        Place {
            name: self.name,
            state: self.state,
            country: self.country,
            coords: Coordinates::new(self.lat, self.lon),
        }
    }
}
