//! Shape predicates for decoded API responses.
//!
//! The remote API can answer HTTP 200 with an error-shaped JSON body, so a
//! successful decode to [`serde_json::Value`] proves nothing. These
//! predicates check exactly the fields the view construction destructures;
//! they return `false` for anything else and never panic.

use serde_json::Value;

fn has_number(v: &Value, pointer: &str) -> bool {
    v.pointer(pointer).is_some_and(Value::is_number)
}

fn has_string(v: &Value, pointer: &str) -> bool {
    v.pointer(pointer).is_some_and(Value::is_string)
}

/// A current-weather payload must carry a non-empty `weather` array plus the
/// numeric fields the Now and Highlights cards read.
pub fn is_valid_current_weather(v: &Value) -> bool {
    has_string(v, "/weather/0/description")
        && has_string(v, "/weather/0/icon")
        && has_number(v, "/main/temp")
        && has_number(v, "/main/feels_like")
        && has_number(v, "/main/pressure")
        && has_number(v, "/main/humidity")
        && has_number(v, "/dt")
        && has_number(v, "/timezone")
        && has_number(v, "/sys/sunrise")
        && has_number(v, "/sys/sunset")
}

/// An air-pollution payload must carry a non-empty `list` whose first entry
/// has the AQI ordinal and a components object.
pub fn is_valid_air_pollution(v: &Value) -> bool {
    has_number(v, "/list/0/main/aqi")
        && v.pointer("/list/0/components").is_some_and(Value::is_object)
}

/// A forecast payload must carry a non-empty `list` of timestamped entries
/// and the city timezone the formatting helpers need.
pub fn is_valid_forecast(v: &Value) -> bool {
    has_number(v, "/list/0/dt")
        && has_number(v, "/list/0/main/temp")
        && has_string(v, "/list/0/weather/0/description")
        && has_number(v, "/city/timezone")
}
