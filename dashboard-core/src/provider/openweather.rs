use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use tracing::instrument;

use crate::{
    error::WeatherError,
    model::{CitySearchResult, Coordinate, CurrentConditions, ForecastPoint, UnitSystem},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the OpenWeatherMap 2.5 API.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at another host, e.g. a proxy or a mock server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        subject: impl FnOnce() -> String,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(subject()));
        }

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self), level = "debug")]
    async fn find(&self, prefix: &str) -> Result<Vec<CitySearchResult>, WeatherError> {
        let parsed: OwFindResponse = self
            .get_json(
                "find",
                &[
                    ("q", prefix.to_string()),
                    ("type", "like".to_string()),
                    ("sort", "population".to_string()),
                ],
                || format!("cities matching '{prefix}'"),
            )
            .await?;

        let cities: Vec<CitySearchResult> =
            parsed.list.into_iter().filter_map(OwFindEntry::into_result).collect();

        tracing::debug!(count = cities.len(), "city search finished");
        Ok(cities)
    }

    #[instrument(skip(self), level = "debug")]
    async fn reverse(&self, coordinate: Coordinate) -> Result<String, WeatherError> {
        let parsed: OwNamedPlace = self
            .get_json(
                "weather",
                &[
                    ("lat", coordinate.latitude.to_string()),
                    ("lon", coordinate.longitude.to_string()),
                ],
                || format!("city near {coordinate}"),
            )
            .await?;

        if parsed.name.trim().is_empty() {
            return Err(WeatherError::NotFound(format!("city near {coordinate}")));
        }

        Ok(parsed.name)
    }

    #[instrument(skip(self), level = "debug")]
    async fn current(&self, city: &str, units: UnitSystem) -> Result<CurrentConditions, WeatherError> {
        let parsed: OwCurrentResponse = self
            .get_json(
                "weather",
                &[("q", city.to_string()), ("units", units.as_str().to_string())],
                || format!("city '{city}'"),
            )
            .await?;

        let description = parsed
            .weather
            .first()
            .and_then(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(CurrentConditions {
            city_name: parsed.name,
            temperature: parsed.main.temp,
            description,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            coordinate: parsed.coord.map(|c| Coordinate::new(c.lat, c.lon)),
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn forecast(
        &self,
        coordinate: Coordinate,
        units: UnitSystem,
    ) -> Result<Vec<ForecastPoint>, WeatherError> {
        let parsed: OwForecastResponse = self
            .get_json(
                "forecast",
                &[
                    ("lat", coordinate.latitude.to_string()),
                    ("lon", coordinate.longitude.to_string()),
                    ("units", units.as_str().to_string()),
                ],
                || format!("forecast for {coordinate}"),
            )
            .await?;

        let points: Vec<ForecastPoint> = parsed
            .list
            .into_iter()
            .map(|entry| {
                let condition = entry.weather.into_iter().next();
                ForecastPoint {
                    timestamp: entry.dt_txt,
                    temperature: entry.main.temp,
                    humidity: entry.main.humidity,
                    wind_speed: entry.wind.speed,
                    condition_main: condition.as_ref().and_then(|w| w.main.clone()),
                    condition_description: condition.and_then(|w| w.description),
                }
            })
            .collect();

        tracing::debug!(count = points.len(), "forecast fetched");
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwNamedPlace {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    coord: Option<OwCoord>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwFindEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    coord: Option<OwCoord>,
    #[serde(default)]
    sys: Option<OwSys>,
}

impl OwFindEntry {
    fn into_result(self) -> Option<CitySearchResult> {
        if self.name.trim().is_empty() {
            return None;
        }
        let coord = self.coord?;
        let country = self.sys.and_then(|s| s.country)?;

        Some(CitySearchResult {
            name: self.name,
            country,
            coordinate: Coordinate::new(coord.lat, coord.lon),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwFindResponse {
    #[serde(default)]
    list: Vec<OwFindEntry>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    #[serde(deserialize_with = "deserialize_dt_txt")]
    dt_txt: NaiveDateTime,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn deserialize_dt_txt<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, DT_TXT_FORMAT).map_err(serde::de::Error::custom)
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn find_cities(&self, prefix: &str) -> Result<Vec<CitySearchResult>, WeatherError> {
        self.find(prefix).await
    }

    async fn resolve_city_name(&self, coordinate: Coordinate) -> Result<String, WeatherError> {
        self.reverse(coordinate).await
    }

    async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        self.current(city, units).await
    }

    async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
        units: UnitSystem,
    ) -> Result<Vec<ForecastPoint>, WeatherError> {
        self.forecast(coordinate, units).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
