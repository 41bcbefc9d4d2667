//! Dashboard orchestration.
//!
//! One load per navigation: current weather is fetched first, and only
//! after it resolves are the reverse-geocode, air-pollution and forecast
//! requests issued concurrently. The result is a single owned [`Dashboard`]
//! view model; the caller renders it, nothing here touches shared state.
//!
//! Current-weather failure fails the whole load. The three secondary
//! fetches degrade instead: a missing location label falls back to
//! [`UNKNOWN_LOCATION`], a failed highlights or forecast section is dropped
//! and recorded in `section_errors`, leaving the dashboard
//! `PartiallyRendered`.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::SkycastError;
use crate::format::{
    aqi_label, degrees_to_cardinal, format_date, format_hour, format_time, mps_to_kmh,
};
use crate::model::{AirPollution, Coordinates, CurrentWeather, Forecast};
use crate::provider::WeatherApi;

/// Label shown when reverse geocoding fails or returns no match.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Hourly section width: 8 entries at 3-hour steps span one day.
const HOURLY_ENTRIES: usize = 8;

/// Daily cards sample every 8th forecast entry starting here, one entry per
/// day at a consistent local hour.
const DAILY_FIRST_INDEX: usize = 7;
const DAILY_STRIDE: usize = 8;

#[derive(Debug, Clone)]
pub struct NowCard {
    pub description: String,
    pub icon: String,
    pub temperature_c: f64,
    pub date: String,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct HighlightsCard {
    pub aqi: u8,
    pub aqi_badge: &'static str,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub sunrise: String,
    pub sunset: String,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub visibility_km: f64,
    pub feels_like_c: f64,
}

impl HighlightsCard {
    fn build(current: &CurrentWeather, pollution: &AirPollution) -> Self {
        Self {
            aqi: pollution.aqi,
            aqi_badge: aqi_label(pollution.aqi),
            no2: pollution.no2,
            o3: pollution.o3,
            so2: pollution.so2,
            pm2_5: pollution.pm2_5,
            sunrise: format_time(current.sunrise, current.timezone_offset),
            sunset: format_time(current.sunset, current.timezone_offset),
            humidity_pct: current.humidity_pct,
            pressure_hpa: current.pressure_hpa,
            visibility_km: current.visibility_m / 1000.0,
            feels_like_c: current.feels_like_c,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HourlyCard {
    pub hour: String,
    pub temperature_c: f64,
    pub icon: String,
    pub wind_deg: u16,
    pub wind_cardinal: &'static str,
    pub wind_kmh: f64,
}

#[derive(Debug, Clone)]
pub struct DailyCard {
    pub date: String,
    pub temperature_c: f64,
    pub description: String,
    pub icon: String,
}

/// Dashboard sections that can fail without failing the whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Highlights,
    Forecast,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Section::Highlights => "highlights",
            Section::Forecast => "forecast",
        })
    }
}

#[derive(Debug, Clone)]
pub struct SectionError {
    pub section: Section,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Rendered,
    PartiallyRendered,
}

/// Everything one navigation produces. Owned, immutable after assembly.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub coords: Coordinates,
    pub now: NowCard,
    pub highlights: Option<HighlightsCard>,
    pub hourly: Vec<HourlyCard>,
    pub daily: Vec<DailyCard>,
    pub section_errors: Vec<SectionError>,
}

impl Dashboard {
    pub fn phase(&self) -> RenderPhase {
        if self.section_errors.is_empty() {
            RenderPhase::Rendered
        } else {
            RenderPhase::PartiallyRendered
        }
    }
}

/// First eight 3-hour steps, i.e. the next 24 hours. Shorter lists render
/// fewer cards.
fn hourly_cards(forecast: &Forecast) -> Vec<HourlyCard> {
    forecast
        .entries
        .iter()
        .take(HOURLY_ENTRIES)
        .map(|entry| HourlyCard {
            hour: format_hour(entry.dt, forecast.timezone_offset),
            temperature_c: entry.temperature_c,
            icon: entry.icon.clone(),
            wind_deg: entry.wind_deg,
            wind_cardinal: degrees_to_cardinal(entry.wind_deg),
            wind_kmh: mps_to_kmh(entry.wind_speed_mps),
        })
        .collect()
}

/// One card per day, sampled at indices 7, 15, 23, ... A list shorter than
/// eight entries yields no daily cards; that is not an error.
fn daily_cards(forecast: &Forecast) -> Vec<DailyCard> {
    forecast
        .entries
        .iter()
        .skip(DAILY_FIRST_INDEX)
        .step_by(DAILY_STRIDE)
        .map(|entry| DailyCard {
            date: format_date(entry.dt, forecast.timezone_offset),
            temperature_c: entry.temperature_c,
            description: entry.description.clone(),
            icon: entry.icon.clone(),
        })
        .collect()
}

/// Load the dashboard for a pair of coordinates.
///
/// The cancellation token is checked at every commit point; a load
/// superseded by a newer navigation returns [`SkycastError::Cancelled`]
/// instead of surfacing stale data.
pub async fn load_dashboard<A>(
    api: &A,
    coords: Coordinates,
    cancel: &CancellationToken,
) -> Result<Dashboard, SkycastError>
where
    A: WeatherApi + ?Sized,
{
    coords.validate()?;
    if cancel.is_cancelled() {
        return Err(SkycastError::Cancelled);
    }

    info!(%coords, "loading dashboard");
    let current = api.current_weather(coords).await?;
    if cancel.is_cancelled() {
        return Err(SkycastError::Cancelled);
    }

    // Current weather is the gate; the rest are independent of each other
    // and may complete in any order.
    let (place, pollution, forecast) = tokio::join!(
        api.reverse_geocode(coords),
        api.air_pollution(coords),
        api.forecast(coords),
    );
    if cancel.is_cancelled() {
        return Err(SkycastError::Cancelled);
    }

    let location = match place {
        Ok(Some(place)) => place.label(),
        Ok(None) => {
            warn!(%coords, "reverse geocode returned no match");
            UNKNOWN_LOCATION.to_string()
        }
        Err(error) => {
            warn!(%coords, %error, "reverse geocode failed");
            UNKNOWN_LOCATION.to_string()
        }
    };

    let mut section_errors = Vec::new();

    let highlights = match pollution {
        Ok(pollution) => Some(HighlightsCard::build(&current, &pollution)),
        Err(error) => {
            warn!(%error, "air pollution fetch failed, dropping highlights");
            section_errors.push(SectionError {
                section: Section::Highlights,
                message: error.to_string(),
            });
            None
        }
    };

    let (hourly, daily) = match forecast {
        Ok(forecast) => (hourly_cards(&forecast), daily_cards(&forecast)),
        Err(error) => {
            warn!(%error, "forecast fetch failed, dropping hourly and daily");
            section_errors.push(SectionError {
                section: Section::Forecast,
                message: error.to_string(),
            });
            (Vec::new(), Vec::new())
        }
    };

    let now = NowCard {
        description: current.description.clone(),
        icon: current.icon.clone(),
        temperature_c: current.temperature_c,
        date: format_date(current.observed_at, current.timezone_offset),
        location,
    };

    Ok(Dashboard {
        coords,
        now,
        highlights,
        hourly,
        daily,
        section_errors,
    })
}

/// Owns the cancellation token for the current navigation.
///
/// Each new navigation cancels the previous token before starting, so at
/// most one load can ever commit and a superseded load can never overwrite
/// a fresh one.
#[derive(Debug)]
pub struct DashboardSession<A: WeatherApi> {
    api: A,
    current: CancellationToken,
    generation: u64,
}

impl<A: WeatherApi> DashboardSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            current: CancellationToken::new(),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel whatever load is in flight and hand out a fresh token for the
    /// next one.
    pub fn begin_navigation(&mut self) -> CancellationToken {
        self.current.cancel();
        self.current = CancellationToken::new();
        self.generation += 1;
        self.current.clone()
    }

    /// Convenience wrapper: start a new navigation and run the load under
    /// its token.
    pub async fn navigate(&mut self, coords: Coordinates) -> Result<Dashboard, SkycastError> {
        let token = self.begin_navigation();
        load_dashboard(&self.api, coords, &token).await
    }

    pub fn cancel(&self) {
        self.current.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirPollution, CurrentWeather, Forecast, ForecastEntry, Place};
    use crate::provider::Endpoint;
    use async_trait::async_trait;
    use std::time::Duration;

    const COORDS: Coordinates = Coordinates {
        lat: 44.4938203,
        lon: 11.3426327,
    };

    fn sample_current() -> CurrentWeather {
        CurrentWeather {
            description: "scattered clouds".to_string(),
            icon: "03d".to_string(),
            observed_at: 1_700_000_000,
            sunrise: 1_699_970_000,
            sunset: 1_700_005_000,
            temperature_c: 21.4,
            feels_like_c: 20.9,
            pressure_hpa: 1015.0,
            humidity_pct: 43,
            visibility_m: 10_000.0,
            timezone_offset: 0,
        }
    }

    fn sample_forecast(len: usize) -> Forecast {
        Forecast {
            timezone_offset: 0,
            entries: (0..len)
                .map(|i| ForecastEntry {
                    dt: 1_700_000_000 + (i as i64) * 10_800,
                    temperature_c: i as f64,
                    description: "light rain".to_string(),
                    icon: "10d".to_string(),
                    wind_deg: 200,
                    wind_speed_mps: 5.0,
                })
                .collect(),
        }
    }

    fn failed(endpoint: Endpoint) -> SkycastError {
        SkycastError::Status {
            endpoint,
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[derive(Debug, Clone)]
    struct StubApi {
        fail_current: bool,
        fail_pollution: bool,
        fail_forecast: bool,
        empty_reverse: bool,
        forecast_len: usize,
        current_delay: Option<Duration>,
    }

    fn stub(forecast_len: usize) -> StubApi {
        StubApi {
            fail_current: false,
            fail_pollution: false,
            fail_forecast: false,
            empty_reverse: false,
            forecast_len,
            current_delay: None,
        }
    }

    #[async_trait]
    impl WeatherApi for StubApi {
        async fn current_weather(
            &self,
            _coords: Coordinates,
        ) -> Result<CurrentWeather, SkycastError> {
            if let Some(delay) = self.current_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_current {
                return Err(failed(Endpoint::CurrentWeather));
            }
            Ok(sample_current())
        }

        async fn air_pollution(&self, _coords: Coordinates) -> Result<AirPollution, SkycastError> {
            if self.fail_pollution {
                return Err(failed(Endpoint::AirPollution));
            }
            Ok(AirPollution {
                aqi: 2,
                no2: 9.5,
                o3: 68.7,
                so2: 1.2,
                pm2_5: 4.3,
            })
        }

        async fn forecast(&self, _coords: Coordinates) -> Result<Forecast, SkycastError> {
            if self.fail_forecast {
                return Err(failed(Endpoint::Forecast));
            }
            Ok(sample_forecast(self.forecast_len))
        }

        async fn geocode(&self, _query: &str) -> Result<Vec<Place>, SkycastError> {
            Ok(Vec::new())
        }

        async fn reverse_geocode(
            &self,
            _coords: Coordinates,
        ) -> Result<Option<Place>, SkycastError> {
            if self.empty_reverse {
                return Ok(None);
            }
            Ok(Some(Place {
                name: "Bologna".to_string(),
                state: None,
                country: "IT".to_string(),
                coords: COORDS,
            }))
        }
    }

    #[tokio::test]
    async fn full_forecast_renders_all_sections() {
        let api = stub(40);
        let token = CancellationToken::new();
        let dashboard = load_dashboard(&api, COORDS, &token).await.unwrap();

        assert_eq!(dashboard.phase(), RenderPhase::Rendered);
        assert_eq!(dashboard.now.location, "Bologna, IT");
        assert_eq!(dashboard.now.description, "scattered clouds");

        let highlights = dashboard.highlights.unwrap();
        assert_eq!(highlights.aqi, 2);
        assert_eq!(highlights.aqi_badge, "Fair");
        assert_eq!(highlights.visibility_km, 10.0);

        assert_eq!(dashboard.hourly.len(), 8);
        assert_eq!(dashboard.hourly[0].wind_kmh, 18.0);
        assert_eq!(dashboard.hourly[0].wind_cardinal, "S");

        // daily cards sample indices 7, 15, 23, 31, 39
        let temps: Vec<f64> = dashboard.daily.iter().map(|d| d.temperature_c).collect();
        assert_eq!(temps, vec![7.0, 15.0, 23.0, 31.0, 39.0]);
    }

    #[tokio::test]
    async fn short_forecast_renders_no_daily_cards() {
        let api = stub(6);
        let token = CancellationToken::new();
        let dashboard = load_dashboard(&api, COORDS, &token).await.unwrap();

        assert_eq!(dashboard.phase(), RenderPhase::Rendered);
        assert_eq!(dashboard.hourly.len(), 6);
        assert!(dashboard.daily.is_empty());
    }

    #[tokio::test]
    async fn empty_reverse_geocode_falls_back_to_placeholder() {
        let api = StubApi {
            empty_reverse: true,
            ..stub(40)
        };
        let token = CancellationToken::new();
        let dashboard = load_dashboard(&api, COORDS, &token).await.unwrap();

        assert_eq!(dashboard.now.location, UNKNOWN_LOCATION);
        // a missing label is cosmetic, not a section failure
        assert_eq!(dashboard.phase(), RenderPhase::Rendered);
    }

    #[tokio::test]
    async fn pollution_failure_degrades_to_partial() {
        let api = StubApi {
            fail_pollution: true,
            ..stub(40)
        };
        let token = CancellationToken::new();
        let dashboard = load_dashboard(&api, COORDS, &token).await.unwrap();

        assert_eq!(dashboard.phase(), RenderPhase::PartiallyRendered);
        assert!(dashboard.highlights.is_none());
        assert_eq!(dashboard.hourly.len(), 8);
        assert_eq!(dashboard.section_errors.len(), 1);
        assert_eq!(dashboard.section_errors[0].section, Section::Highlights);
    }

    #[tokio::test]
    async fn forecast_failure_degrades_to_partial() {
        let api = StubApi {
            fail_forecast: true,
            ..stub(40)
        };
        let token = CancellationToken::new();
        let dashboard = load_dashboard(&api, COORDS, &token).await.unwrap();

        assert_eq!(dashboard.phase(), RenderPhase::PartiallyRendered);
        assert!(dashboard.hourly.is_empty());
        assert!(dashboard.daily.is_empty());
        assert!(dashboard.highlights.is_some());
        assert_eq!(dashboard.section_errors[0].section, Section::Forecast);
    }

    #[tokio::test]
    async fn current_weather_failure_fails_the_load() {
        let api = StubApi {
            fail_current: true,
            ..stub(40)
        };
        let token = CancellationToken::new();
        let err = load_dashboard(&api, COORDS, &token).await.unwrap_err();

        assert!(matches!(err, SkycastError::Status { .. }));
    }

    #[tokio::test]
    async fn invalid_coordinates_fail_before_any_fetch() {
        let api = stub(40);
        let token = CancellationToken::new();
        let err = load_dashboard(&api, Coordinates::new(120.0, 0.0), &token)
            .await
            .unwrap_err();

        assert!(matches!(err, SkycastError::InvalidCoordinates { .. }));
    }

    #[tokio::test]
    async fn cancelled_token_aborts_the_load() {
        let api = stub(40);
        let token = CancellationToken::new();
        token.cancel();

        let err = load_dashboard(&api, COORDS, &token).await.unwrap_err();
        assert!(matches!(err, SkycastError::Cancelled));
    }

    #[tokio::test]
    async fn renavigation_cancels_the_inflight_load() {
        let api = StubApi {
            current_delay: Some(Duration::from_millis(50)),
            ..stub(40)
        };
        let mut session = DashboardSession::new(api.clone());

        let token = session.begin_navigation();
        let inflight = tokio::spawn(async move { load_dashboard(&api, COORDS, &token).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        session.begin_navigation();

        let result = inflight.await.unwrap();
        assert!(matches!(result, Err(SkycastError::Cancelled)));
    }

    #[tokio::test]
    async fn session_navigate_bumps_the_generation() {
        let mut session = DashboardSession::new(stub(40));
        assert_eq!(session.generation(), 0);

        let dashboard = session.navigate(COORDS).await.unwrap();
        assert_eq!(session.generation(), 1);
        assert_eq!(dashboard.phase(), RenderPhase::Rendered);

        session.navigate(COORDS).await.unwrap();
        assert_eq!(session.generation(), 2);
    }
}
