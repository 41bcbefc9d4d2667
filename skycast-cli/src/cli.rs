use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use skycast_core::{
    Config, Coordinates, DashboardSession, OpenWeatherClient, SkycastError, WeatherApi,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Coordinate-driven weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional default location.
    Configure,

    /// Show the dashboard for a place query, explicit coordinates, or the
    /// configured default location.
    Show {
        /// Free-text place name; the first geocode match is used.
        query: Option<String>,

        /// Latitude in degrees; requires --lon and takes precedence over QUERY.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees; requires --lat.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// List geocode matches for a place query.
    Search { query: String },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { query, lat, lon } => show(query, lat, lon).await,
            Command::Search { query } => search(&query).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let set_home = inquire::Confirm::new("Set a default location for `skycast show`?")
        .with_default(false)
        .prompt()?;

    if set_home {
        let lat: f64 = inquire::Text::new("Latitude:")
            .prompt()?
            .trim()
            .parse()
            .context("Latitude must be a number")?;
        let lon: f64 = inquire::Text::new("Longitude:")
            .prompt()?
            .trim()
            .parse()
            .context("Longitude must be a number")?;

        let coords = Coordinates::new(lat, lon);
        coords.validate()?;

        let label = inquire::Text::new("Label (optional, e.g. \"Bologna, IT\"):").prompt()?;
        let label = Some(label.trim().to_string()).filter(|l| !l.is_empty());

        config.set_default_location(label, coords);
    }

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn show(query: Option<String>, lat: Option<f64>, lon: Option<f64>) -> Result<()> {
    let config = Config::load()?;
    let client = OpenWeatherClient::from_config(&config)?;

    let coords = match (query, lat, lon) {
        (_, Some(lat), Some(lon)) => Coordinates::new(lat, lon),
        (Some(query), _, _) => {
            let places = client.geocode(&query).await?;
            let place = places
                .into_iter()
                .next()
                .ok_or(SkycastError::NoMatches { query })?;
            tracing::info!(place = %place.label(), "resolved query");
            place.coords
        }
        _ => match config.default_location.as_ref() {
            Some(home) => home.coords(),
            None => bail!(
                "No coordinates given and no default location configured.\n\
                 Hint: pass --lat/--lon or a place name, or run `skycast configure`."
            ),
        },
    };

    let mut session = DashboardSession::new(client);
    let dashboard = session.navigate(coords).await?;

    print!("{}", render::render_dashboard(&dashboard));
    Ok(())
}

async fn search(query: &str) -> Result<()> {
    let config = Config::load()?;
    let client = OpenWeatherClient::from_config(&config)?;

    let places = client.geocode(query).await?;
    if places.is_empty() {
        println!("No places matched '{query}'.");
        return Ok(());
    }

    for place in &places {
        println!("{:<40} {}", place.label(), place.coords);
    }
    Ok(())
}
