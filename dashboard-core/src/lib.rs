//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the `WeatherProvider` abstraction
//! - Geolocation sources
//! - Forecast aggregation (daily summaries, chart series, condition counts)
//! - The view-state controller that ties fetches to UI selections
//!
//! It is used by `weather-dashboard`, but any front end can drive a
//! [`Dashboard`] and render its [`DashboardView`].

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;

pub use aggregate::{ChartSeries, ConditionHistogram, Metric, SeriesPoint};
pub use config::Config;
pub use controller::{AppState, Dashboard, DashboardView, LocateError, SuggestionQuery};
pub use error::{GeolocationError, WeatherError};
pub use geolocation::{FixedPosition, GeolocationSource, NoGeolocation};
pub use model::{
    CitySearchResult, Coordinate, CurrentConditions, DailyForecastSummary, DisplayMode,
    ForecastPoint, UnitSystem, ViewState,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
