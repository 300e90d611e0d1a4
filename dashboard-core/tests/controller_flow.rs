//! Integration tests for the Dashboard controller against a scripted provider.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use weather_dashboard_core::{
    CitySearchResult, Coordinate, CurrentConditions, Dashboard, DisplayMode, FixedPosition,
    ForecastPoint, GeolocationError, GeolocationSource, LocateError, Metric, NoGeolocation,
    SuggestionQuery, UnitSystem, ViewState, WeatherError, WeatherProvider,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Find(String),
    Reverse(Coordinate),
    Current(String, UnitSystem),
    Forecast(Coordinate, UnitSystem),
}

/// Provider that answers from fixed tables and records every call.
#[derive(Debug, Default)]
struct ScriptedProvider {
    calls: Mutex<Vec<Call>>,
    cities: HashMap<String, Coordinate>,
    slow_cities: HashMap<String, Duration>,
    reverse: Option<String>,
    fail_forecast: bool,
    fail_find: bool,
    fail_imperial: bool,
}

impl ScriptedProvider {
    fn new() -> Self {
        let mut cities = HashMap::new();
        cities.insert("Hyderabad".to_string(), Coordinate::new(17.38, 78.47));
        cities.insert("Paris".to_string(), Coordinate::new(48.85, 2.35));
        cities.insert("Rome".to_string(), Coordinate::new(41.9, 12.5));
        Self { cities, reverse: Some("Paris".into()), ..Self::default() }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn point(ts: &str, temp: f64, main: &str) -> ForecastPoint {
    ForecastPoint {
        timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
        temperature: temp,
        humidity: 60,
        wind_speed: 3.0,
        condition_main: Some(main.to_string()),
        condition_description: Some(main.to_lowercase()),
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn find_cities(&self, prefix: &str) -> Result<Vec<CitySearchResult>, WeatherError> {
        self.record(Call::Find(prefix.to_string()));
        if self.fail_find {
            return Err(WeatherError::Status { status: 500, body: "boom".into() });
        }

        Ok(self
            .cities
            .iter()
            .filter(|(name, _)| name.to_lowercase().starts_with(&prefix.to_lowercase()))
            .map(|(name, coord)| CitySearchResult {
                name: name.clone(),
                country: "XX".into(),
                coordinate: *coord,
            })
            .collect())
    }

    async fn resolve_city_name(&self, coordinate: Coordinate) -> Result<String, WeatherError> {
        self.record(Call::Reverse(coordinate));
        self.reverse
            .clone()
            .ok_or_else(|| WeatherError::NotFound(format!("city near {coordinate}")))
    }

    async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        self.record(Call::Current(city.to_string(), units));
        if let Some(delay) = self.slow_cities.get(city) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_imperial && units == UnitSystem::Imperial {
            return Err(WeatherError::Status { status: 503, body: String::new() });
        }

        let coord = self
            .cities
            .get(city)
            .ok_or_else(|| WeatherError::NotFound(format!("city '{city}'")))?;

        Ok(CurrentConditions {
            city_name: city.to_string(),
            temperature: if units == UnitSystem::Metric { 25.0 } else { 77.0 },
            description: "clear sky".into(),
            humidity: 50,
            wind_speed: 2.0,
            coordinate: Some(*coord),
        })
    }

    async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
        units: UnitSystem,
    ) -> Result<Vec<ForecastPoint>, WeatherError> {
        self.record(Call::Forecast(coordinate, units));
        if self.fail_forecast || (self.fail_imperial && units == UnitSystem::Imperial) {
            return Err(WeatherError::Status { status: 503, body: String::new() });
        }

        Ok(vec![
            point("2026-10-19 15:00:00", 20.0, "Clear"),
            point("2026-10-19 18:00:00", 22.0, "Clouds"),
            point("2026-10-19 21:00:00", 24.0, "Clouds"),
            point("2026-10-20 00:00:00", 18.0, "Rain"),
            point("2026-10-20 03:00:00", 19.0, "Rain"),
            point("2026-10-20 06:00:00", 20.0, "Rain"),
            point("2026-10-20 09:00:00", 21.0, "Clear"),
            point("2026-10-20 12:00:00", 22.0, "Clear"),
        ])
    }
}

#[derive(Debug)]
struct DeniedGeolocation;

#[async_trait]
impl GeolocationSource for DeniedGeolocation {
    async fn request_current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

fn dashboard<G: GeolocationSource>(
    provider: ScriptedProvider,
    geolocation: G,
) -> Dashboard<ScriptedProvider, G> {
    Dashboard::new(provider, geolocation, ViewState::new("Hyderabad", UnitSystem::Metric))
}

#[tokio::test]
async fn test_refresh_fetches_current_then_forecast() {
    let dash = dashboard(ScriptedProvider::new(), NoGeolocation);
    dash.refresh().await;

    let hyd = Coordinate::new(17.38, 78.47);
    assert_eq!(
        dash.provider().calls(),
        vec![
            Call::Current("Hyderabad".into(), UnitSystem::Metric),
            Call::Forecast(hyd, UnitSystem::Metric),
        ]
    );

    let view = dash.view();
    assert_eq!(view.current.as_ref().map(|c| c.city_name.as_str()), Some("Hyderabad"));
    assert!(!view.loading);
    assert!(view.has_forecast);
    assert_eq!(view.daily.len(), 2);
    assert_eq!(view.daily[0].average_temperature, 22.0);
    assert_eq!(view.daily[1].average_temperature, 20.0);
    assert_eq!(view.chart(Metric::Temperature).map(|c| c.points.len()), Some(6));
    assert_eq!(view.conditions.total(), 8);
    assert_eq!(view.conditions.get("Rain"), Some(3));
}

#[tokio::test]
async fn test_unknown_city_skips_forecast_and_flags_error() {
    let dash = Dashboard::new(
        ScriptedProvider::new(),
        NoGeolocation,
        ViewState::new("Atlantis", UnitSystem::Metric),
    );
    dash.refresh().await;

    assert_eq!(
        dash.provider().calls(),
        vec![Call::Current("Atlantis".into(), UnitSystem::Metric)]
    );
    let view = dash.view();
    assert!(view.current.is_none());
    assert!(view.current_error.is_some());
    assert!(!view.has_forecast);
}

#[tokio::test]
async fn test_unit_toggle_refetches_both_with_new_unit() {
    let dash = dashboard(ScriptedProvider::new(), NoGeolocation);
    dash.refresh().await;
    dash.set_unit_system(UnitSystem::Imperial).await;

    let calls = dash.provider().calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[2], Call::Current("Hyderabad".into(), UnitSystem::Imperial));
    assert_eq!(calls[3], Call::Forecast(Coordinate::new(17.38, 78.47), UnitSystem::Imperial));

    let view = dash.view();
    assert_eq!(view.view.city, "Hyderabad");
    assert_eq!(view.view.unit_system, UnitSystem::Imperial);
    assert_eq!(view.current_units, Some(UnitSystem::Imperial));
    assert_eq!(view.forecast_units, Some(UnitSystem::Imperial));
    assert_eq!(view.current.map(|c| c.temperature), Some(77.0));
}

#[tokio::test]
async fn test_failed_unit_toggle_keeps_readings_tagged_with_old_unit() {
    let provider = ScriptedProvider { fail_imperial: true, ..ScriptedProvider::new() };
    let dash = dashboard(provider, NoGeolocation);
    dash.refresh().await;
    dash.set_unit_system(UnitSystem::Imperial).await;

    let calls = dash.provider().calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2], Call::Current("Hyderabad".into(), UnitSystem::Imperial));

    let view = dash.view();
    assert_eq!(view.view.unit_system, UnitSystem::Imperial);
    assert!(view.current_error.is_some());
    assert_eq!(view.current.as_ref().map(|c| c.temperature), Some(25.0));
    assert_eq!(view.current_units, Some(UnitSystem::Metric));
    assert_eq!(view.forecast_units, Some(UnitSystem::Metric));
    assert!(view.has_forecast);
}

#[tokio::test]
async fn test_setting_same_unit_is_a_no_op() {
    let dash = dashboard(ScriptedProvider::new(), NoGeolocation);
    dash.set_unit_system(UnitSystem::Metric).await;

    assert!(dash.provider().calls().is_empty());
}

#[tokio::test]
async fn test_short_query_never_hits_network() {
    let dash = dashboard(ScriptedProvider::new(), NoGeolocation);

    assert!(matches!(dash.edit_city_text("Par").await, SuggestionQuery::Updated(1)));
    assert_eq!(dash.view().suggestions.len(), 1);

    let outcome = dash.edit_city_text("Pa").await;

    assert_eq!(outcome, SuggestionQuery::Skipped);
    assert!(dash.view().suggestions.is_empty());
    assert_eq!(dash.view().city_input, "Pa");
    assert_eq!(dash.provider().calls(), vec![Call::Find("Par".into())]);
}

#[tokio::test]
async fn test_failed_suggestion_lookup_empties_list() {
    let provider = ScriptedProvider { fail_find: true, ..ScriptedProvider::new() };
    let dash = dashboard(provider, NoGeolocation);

    assert_eq!(dash.edit_city_text("Rom").await, SuggestionQuery::Failed);
    assert!(dash.view().suggestions.is_empty());
}

#[tokio::test]
async fn test_select_suggestion_sets_city_and_fetches() {
    let dash = dashboard(ScriptedProvider::new(), NoGeolocation);
    dash.edit_city_text("Rom").await;

    assert!(dash.select_suggestion(0).await);

    let view = dash.view();
    assert_eq!(view.view.city, "Rome");
    assert_eq!(view.city_input, "Rome");
    assert!(view.suggestions.is_empty());
    assert_eq!(view.current.map(|c| c.city_name), Some("Rome".to_string()));

    assert!(!dash.select_suggestion(5).await);
}

#[tokio::test]
async fn test_submit_city_uses_typed_text() {
    let dash = dashboard(ScriptedProvider::new(), NoGeolocation);
    dash.edit_city_text("  Paris ").await;

    assert!(dash.submit_city().await);
    assert_eq!(dash.view_state().city, "Paris");

    dash.edit_city_text("   ").await;
    assert!(!dash.submit_city().await);
    assert_eq!(dash.view_state().city, "Paris");
}

#[tokio::test]
async fn test_use_current_location_resolves_city() {
    let dash = dashboard(ScriptedProvider::new(), FixedPosition(Coordinate::new(48.8, 2.3)));

    let city = dash.use_current_location().await.unwrap();

    assert_eq!(city, "Paris");
    assert_eq!(dash.provider().calls()[0], Call::Reverse(Coordinate::new(48.8, 2.3)));
    assert_eq!(dash.view().current.map(|c| c.city_name), Some("Paris".to_string()));
}

#[tokio::test]
async fn test_failed_reverse_geocode_leaves_state_intact() {
    let provider = ScriptedProvider { reverse: None, ..ScriptedProvider::new() };
    let dash = dashboard(provider, FixedPosition(Coordinate::new(0.0, -30.0)));
    dash.refresh().await;
    let before = dash.view();

    let err = dash.use_current_location().await.unwrap_err();

    assert!(matches!(err, LocateError::ReverseGeocode(_)));
    let after = dash.view();
    assert_eq!(after.view.city, "Hyderabad");
    assert_eq!(after.current, before.current);
    assert_eq!(after.daily, before.daily);
}

#[tokio::test]
async fn test_denied_geolocation_never_calls_provider() {
    let dash = dashboard(ScriptedProvider::new(), DeniedGeolocation);

    let err = dash.use_current_location().await.unwrap_err();

    assert!(matches!(err, LocateError::Geolocation(GeolocationError::PermissionDenied)));
    assert!(dash.provider().calls().is_empty());
    assert_eq!(dash.view_state().city, "Hyderabad");
}

#[tokio::test]
async fn test_forecast_failure_sets_flag_but_keeps_current() {
    let provider = ScriptedProvider { fail_forecast: true, ..ScriptedProvider::new() };
    let dash = dashboard(provider, NoGeolocation);
    dash.refresh().await;

    let view = dash.view();
    assert!(view.forecast_error);
    assert!(view.current.is_some());
    assert!(view.daily.is_empty());
}

#[tokio::test]
async fn test_superseded_city_response_is_discarded() {
    let mut provider = ScriptedProvider::new();
    provider.slow_cities.insert("Paris".into(), Duration::from_millis(100));
    let dash = dashboard(provider, NoGeolocation);

    dash.edit_city_text("Paris").await;
    let slow = async {
        dash.submit_city().await;
    };
    let fast = async {
        // Let the slow request go out first.
        tokio::task::yield_now().await;
        dash.edit_city_text("Rome").await;
        dash.submit_city().await;
    };
    tokio::join!(slow, fast);

    let view = dash.view();
    assert_eq!(view.view.city, "Rome");
    assert_eq!(view.current.map(|c| c.city_name), Some("Rome".to_string()));

    let forecasts: Vec<Call> = dash
        .provider()
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Forecast(..)))
        .collect();
    assert_eq!(forecasts, vec![Call::Forecast(Coordinate::new(41.9, 12.5), UnitSystem::Metric)]);
}

#[tokio::test]
async fn test_connectivity_and_display_mode_are_view_only() {
    let dash = dashboard(ScriptedProvider::new(), NoGeolocation);

    dash.set_online(false);
    dash.set_display_mode(DisplayMode::ConditionsPie);
    dash.refresh().await;

    let view = dash.view();
    assert!(!view.view.online);
    assert_eq!(view.view.display_mode, DisplayMode::ConditionsPie);
    assert!(view.current.is_some());
}
