use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Display convention for temperatures and wind speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the provider's `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(UnitSystem::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// Which view of the forecast is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Forecast,
    TempGraph,
    HumidityGraph,
    WindGraph,
    ConditionsPie,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Forecast => "forecast",
            DisplayMode::TempGraph => "temp",
            DisplayMode::HumidityGraph => "humidity",
            DisplayMode::WindGraph => "wind",
            DisplayMode::ConditionsPie => "conditions",
        }
    }

    /// Human-readable label, as shown in a view selector.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Forecast => "Forecast",
            DisplayMode::TempGraph => "Temperature Graph",
            DisplayMode::HumidityGraph => "Humidity Graph",
            DisplayMode::WindGraph => "Wind Speed Graph",
            DisplayMode::ConditionsPie => "Weather Conditions",
        }
    }

    pub const fn all() -> &'static [DisplayMode] {
        &[
            DisplayMode::Forecast,
            DisplayMode::TempGraph,
            DisplayMode::HumidityGraph,
            DisplayMode::WindGraph,
            DisplayMode::ConditionsPie,
        ]
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for DisplayMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "forecast" => Ok(DisplayMode::Forecast),
            "temp" | "temperature" | "graph" => Ok(DisplayMode::TempGraph),
            "humidity" => Ok(DisplayMode::HumidityGraph),
            "wind" | "windspeed" | "wind-speed" => Ok(DisplayMode::WindGraph),
            "conditions" | "pie" => Ok(DisplayMode::ConditionsPie),
            _ => Err(anyhow::anyhow!(
                "Unknown view '{value}'. Supported views: forecast, temp, humidity, wind, conditions."
            )),
        }
    }
}

/// A city returned by the suggestion lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySearchResult {
    pub name: String,
    pub country: String,
    pub coordinate: Coordinate,
}

impl fmt::Display for CitySearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

/// Present weather for a city, replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city_name: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    /// Position reported by the provider; the forecast is fetched for it.
    pub coordinate: Option<Coordinate>,
}

/// One 3-hour step of the provider forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Wall-clock time as reported by the provider, read as local calendar time.
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition_main: Option<String>,
    pub condition_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastSummary {
    pub date: NaiveDate,
    pub average_temperature: f64,
    pub representative_condition: String,
}

/// UI selections that live for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub city: String,
    pub unit_system: UnitSystem,
    pub display_mode: DisplayMode,
    pub online: bool,
}

impl ViewState {
    pub fn new(city: impl Into<String>, unit_system: UnitSystem) -> Self {
        Self {
            city: city.into(),
            unit_system,
            display_mode: DisplayMode::default(),
            online: true,
        }
    }
}
