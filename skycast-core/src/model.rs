use crate::error::SkycastError;
use serde::{Deserialize, Serialize};

/// A point on the globe. Produced by the CLI arguments, a geocode lookup or
/// the configured default location; consumed by the orchestrator and the
/// API gateway. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject values outside |lat| <= 90, |lon| <= 180 before any request
    /// is built from them.
    pub fn validate(&self) -> Result<(), SkycastError> {
        if self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
        {
            Ok(())
        } else {
            Err(SkycastError::InvalidCoordinates {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Current conditions at a location, already converted from the wire shape.
/// Timestamps are Unix UTC seconds; `timezone_offset` is the location's
/// offset from UTC in seconds and must be applied for local display.
#[derive(Debug, Clone)]
pub struct CurrentWeather {
    pub description: String,
    pub icon: String,
    pub observed_at: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub pressure_hpa: f64,
    pub humidity_pct: u8,
    pub visibility_m: f64,
    pub timezone_offset: i32,
}

/// Air quality snapshot. `aqi` is the ordinal 1..=5 severity index;
/// component concentrations are in µg/m³.
#[derive(Debug, Clone)]
pub struct AirPollution {
    pub aqi: u8,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
}

/// One 3-hour forecast step.
#[derive(Debug, Clone)]
pub struct ForecastEntry {
    pub dt: i64,
    pub temperature_c: f64,
    pub description: String,
    pub icon: String,
    pub wind_deg: u16,
    pub wind_speed_mps: f64,
}

/// Ordered 5-day / 3-hour forecast for a location, plus the timezone offset
/// the display formatting needs.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
    pub timezone_offset: i32,
}

/// A named place from the geocoding API. Zero or more per query.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub coords: Coordinates,
}

impl Place {
    /// Human-readable label, preferring the state for disambiguation and
    /// falling back to the country.
    pub fn label(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}", self.name, state),
            None if !self.country.is_empty() => format!("{}, {}", self.name, self.country),
            None => self.name.clone(),
        }
    }
}
