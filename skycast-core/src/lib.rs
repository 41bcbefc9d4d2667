//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration (API key, default location)
//! - The OpenWeather HTTP gateway behind the [`provider::WeatherApi`] trait
//! - Response-shape validators and display-formatting helpers
//! - The dashboard orchestrator: one load per navigation, current weather
//!   first, then reverse-geocode / air-pollution / forecast concurrently,
//!   assembled into a [`dashboard::Dashboard`] view model
//!
//! It is used by `skycast-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod model;
pub mod provider;
pub mod validate;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardSession, RenderPhase, load_dashboard};
pub use error::SkycastError;
pub use model::{AirPollution, Coordinates, CurrentWeather, Forecast, Place};
pub use provider::{WeatherApi, openweather::OpenWeatherClient};
