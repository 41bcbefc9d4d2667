//! Render the dashboard view model as plain-text terminal sections.
//!
//! Pure string assembly: the orchestrator hands over an owned
//! [`Dashboard`] and this module never reaches back into any state.

use skycast_core::Dashboard;
use skycast_core::dashboard::RenderPhase;

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let now = &dashboard.now;

    out.push_str(&format!("Now: {}\n", now.location));
    out.push_str(&format!("  {}\n", now.date));
    out.push_str(&format!(
        "  {:.1}°C  {}\n",
        now.temperature_c, now.description
    ));

    if let Some(h) = &dashboard.highlights {
        out.push_str("\nToday's Highlights\n");
        out.push_str(&format!(
            "  Air quality: {} (AQI {})  NO2 {:.1}  O3 {:.1}  SO2 {:.1}  PM2.5 {:.1}\n",
            h.aqi_badge, h.aqi, h.no2, h.o3, h.so2, h.pm2_5
        ));
        out.push_str(&format!(
            "  Sunrise {}   Sunset {}\n",
            h.sunrise, h.sunset
        ));
        out.push_str(&format!(
            "  Humidity {}%   Pressure {:.0} hPa   Visibility {:.1} km   Feels like {:.1}°C\n",
            h.humidity_pct, h.pressure_hpa, h.visibility_km, h.feels_like_c
        ));
    }

    if !dashboard.hourly.is_empty() {
        out.push_str("\nNext 24 Hours\n");
        for card in &dashboard.hourly {
            out.push_str(&format!(
                "  {:>5}   {:>6.1}°C   wind {} {:.0} km/h\n",
                card.hour, card.temperature_c, card.wind_cardinal, card.wind_kmh
            ));
        }
    }

    if !dashboard.daily.is_empty() {
        out.push_str("\n5-Day Forecast\n");
        for card in &dashboard.daily {
            out.push_str(&format!(
                "  {:<20} {:>6.1}°C   {}\n",
                card.date, card.temperature_c, card.description
            ));
        }
    }

    if dashboard.phase() == RenderPhase::PartiallyRendered {
        out.push_str("\nSome sections could not be loaded:\n");
        for err in &dashboard.section_errors {
            out.push_str(&format!("  - {}: {}\n", err.section, err.message));
        }
    }

    out
}
