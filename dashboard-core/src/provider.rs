use crate::{
    Config,
    error::WeatherError,
    model::{CitySearchResult, Coordinate, CurrentConditions, ForecastPoint, UnitSystem},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Remote source of weather data.
///
/// Each call issues exactly one request; implementations never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Cities whose name matches `prefix`, most populous first.
    async fn find_cities(&self, prefix: &str) -> Result<Vec<CitySearchResult>, WeatherError>;

    /// Name of the city nearest to `coordinate`.
    async fn resolve_city_name(&self, coordinate: Coordinate) -> Result<String, WeatherError>;

    async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError>;

    /// 3-hour forecast series in chronological order.
    async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
        units: UnitSystem,
    ) -> Result<Vec<ForecastPoint>, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weather-dashboard configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key, base_url),
        None => OpenWeatherProvider::new(api_key),
    };

    Ok(provider)
}
