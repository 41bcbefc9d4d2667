use crate::provider::Endpoint;
use thiserror::Error;

/// Errors produced by the dashboard pipeline.
///
/// Every fetch returns a `Result` carrying one of these; nothing in the
/// pipeline reports failure out-of-band. Section-level degradation inside an
/// otherwise successful load is carried on the `Dashboard` itself, not here.
#[derive(Debug, Error)]
pub enum SkycastError {
    #[error("failed to initialize HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: Endpoint },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    /// The remote API answered 2xx with a body the renderer cannot use
    /// (error payloads shaped as JSON, missing fields, empty lists).
    #[error("{endpoint} response did not have the expected shape")]
    UnexpectedShape { endpoint: Endpoint },

    #[error("coordinates out of range: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("no places matched '{query}'")]
    NoMatches { query: String },

    #[error(
        "no OpenWeather API key configured.\n\
         Hint: run `skycast configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("dashboard load was cancelled by a newer navigation")]
    Cancelled,
}

impl SkycastError {
    /// Classify a transport-level failure, keeping timeouts distinct so the
    /// caller can tell a slow upstream from an unreachable one.
    pub(crate) fn from_reqwest(endpoint: Endpoint, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            SkycastError::Timeout { endpoint }
        } else {
            SkycastError::Network { endpoint, source }
        }
    }
}
