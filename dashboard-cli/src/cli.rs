use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use weather_dashboard_core::{
    Config, Coordinate, Dashboard, DisplayMode, OpenWeatherProvider, SuggestionQuery, UnitSystem,
    ViewState,
    geolocation::{self, GeolocationSource},
    provider_from_config,
};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and display preferences.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,

        /// metric or imperial; defaults to the configured units.
        #[arg(long, value_parser = parse_units)]
        units: Option<UnitSystem>,

        /// forecast, temp, humidity, wind or conditions.
        #[arg(long, value_parser = parse_view, default_value = "forecast")]
        view: DisplayMode,
    },

    /// List cities matching a name prefix.
    Suggest {
        prefix: String,
    },

    /// Show weather for the city nearest to the current position.
    Locate {
        /// Latitude; defaults to the configured home position.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude; defaults to the configured home position.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long, value_parser = parse_units)]
        units: Option<UnitSystem>,

        #[arg(long, value_parser = parse_view, default_value = "forecast")]
        view: DisplayMode,
    },

    /// Interactive dashboard.
    Dashboard,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(value).map_err(|e| e.to_string())
}

fn parse_view(value: &str) -> Result<DisplayMode, String> {
    DisplayMode::try_from(value).map_err(|e| e.to_string())
}

type CliDashboard = Dashboard<OpenWeatherProvider, Box<dyn GeolocationSource>>;

fn build_dashboard(
    config: &Config,
    city: &str,
    units: UnitSystem,
    position: Option<Coordinate>,
) -> anyhow::Result<CliDashboard> {
    let provider = provider_from_config(config)?;
    let geolocation = geolocation::source_for(position.or(config.home));

    Ok(Dashboard::new(provider, geolocation, ViewState::new(city, units)))
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city, units, view } => {
                let config = Config::load()?;
                let city = city.unwrap_or_else(|| config.city().to_string());
                let dash = build_dashboard(&config, &city, units.unwrap_or(config.units), None)?;

                dash.set_display_mode(view);
                dash.refresh().await;
                println!("{}", render::Panel(&dash.view()));
            }
            Command::Suggest { prefix } => {
                let config = Config::load()?;
                let dash = build_dashboard(&config, config.city(), config.units, None)?;

                match dash.edit_city_text(&prefix).await {
                    SuggestionQuery::Skipped => {
                        println!("Type at least 3 characters to get suggestions.");
                    }
                    SuggestionQuery::Failed => {
                        println!("Could not look up cities right now.");
                    }
                    SuggestionQuery::Updated(_) | SuggestionQuery::Superseded => {
                        print!("{}", render::Suggestions(&dash.view().suggestions));
                    }
                }
            }
            Command::Locate { lat, lon, units, view } => {
                let config = Config::load()?;
                let position = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
                let dash = build_dashboard(
                    &config,
                    config.city(),
                    units.unwrap_or(config.units),
                    position,
                )?;

                dash.set_display_mode(view);
                dash.use_current_location()
                    .await
                    .context("Could not use the current location")?;
                println!("{}", render::Panel(&dash.view()));
            }
            Command::Dashboard => {
                let config = Config::load()?;
                let dash = build_dashboard(&config, config.city(), config.units, None)?;
                interactive::run(&dash).await?;
            }
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let city = Text::new("Default city:").with_default(config.city()).prompt()?;
    config.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());

    let units = Select::new("Units:", vec![UnitSystem::Metric, UnitSystem::Imperial])
        .with_starting_cursor(usize::from(config.units == UnitSystem::Imperial))
        .prompt()?;
    config.units = units;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    if !config.has_api_key() {
        println!("No API key stored yet; set OPENWEATHER_API_KEY or run configure again.");
    }

    Ok(())
}
