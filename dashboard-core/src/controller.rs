//! View-state controller.
//!
//! [`AppState`] is the single state container of a dashboard session and
//! [`Dashboard`] drives the provider calls that feed it. Actions take `&self`
//! so several of them can be in flight on one thread; the state is only
//! touched between await points and never borrowed across one.
//!
//! Every fetch carries a [`Ticket`]. A response whose ticket has been
//! superseded by a newer request for the same resource is dropped.

use serde::Serialize;
use std::cell::RefCell;

use crate::{
    aggregate::{self, ChartSeries, ConditionHistogram, Metric},
    error::{GeolocationError, WeatherError},
    geolocation::GeolocationSource,
    model::{
        CitySearchResult, Coordinate, CurrentConditions, DailyForecastSummary, DisplayMode,
        ForecastPoint, UnitSystem, ViewState,
    },
    provider::WeatherProvider,
};

/// Suggestions are only looked up for inputs longer than this.
pub const MIN_SUGGESTION_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Suggestions,
    Current,
    Forecast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    resource: Resource,
    seq: u64,
    units: UnitSystem,
}

/// Per-resource request sequence numbers.
#[derive(Debug, Default)]
pub struct RequestTracker {
    suggestions: u64,
    current: u64,
    forecast: u64,
}

impl RequestTracker {
    fn counter(&mut self, resource: Resource) -> &mut u64 {
        match resource {
            Resource::Suggestions => &mut self.suggestions,
            Resource::Current => &mut self.current,
            Resource::Forecast => &mut self.forecast,
        }
    }

    /// Start a request for `resource` whose readings come in `units`.
    pub fn issue(&mut self, resource: Resource, units: UnitSystem) -> Ticket {
        let counter = self.counter(resource);
        *counter += 1;
        Ticket { resource, seq: *counter, units }
    }

    pub fn latest(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Suggestions => self.suggestions,
            Resource::Current => self.current,
            Resource::Forecast => self.forecast,
        }
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest(ticket.resource) == ticket.seq
    }
}

/// Result of editing the city input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionQuery {
    /// Input too short; suggestions were cleared without a request.
    Skipped,
    /// The list was replaced with this many entries.
    Updated(usize),
    /// The lookup failed; the list was emptied.
    Failed,
    /// A newer edit arrived first; this response was dropped.
    Superseded,
}

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
    #[error("could not resolve a city name: {0}")]
    ReverseGeocode(#[from] WeatherError),
}

/// Session state. All mutation goes through the methods below.
#[derive(Debug)]
pub struct AppState {
    view: ViewState,
    city_input: String,
    suggestions: Vec<CitySearchResult>,
    current: Option<CurrentConditions>,
    current_units: Option<UnitSystem>,
    forecast: Option<Vec<ForecastPoint>>,
    forecast_units: Option<UnitSystem>,
    loading: bool,
    current_error: Option<String>,
    forecast_error: bool,
    requests: RequestTracker,
}

impl AppState {
    pub fn new(view: ViewState) -> Self {
        Self {
            city_input: view.city.clone(),
            view,
            suggestions: Vec::new(),
            current: None,
            current_units: None,
            forecast: None,
            forecast_units: None,
            loading: false,
            current_error: None,
            forecast_error: false,
            requests: RequestTracker::default(),
        }
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn city_input(&self) -> &str {
        &self.city_input
    }

    pub fn suggestions(&self) -> &[CitySearchResult] {
        &self.suggestions
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    /// Units the stored conditions were fetched in; may lag the selection
    /// after a failed refetch.
    pub fn current_units(&self) -> Option<UnitSystem> {
        self.current_units
    }

    pub fn forecast(&self) -> Option<&[ForecastPoint]> {
        self.forecast.as_deref()
    }

    pub fn forecast_units(&self) -> Option<UnitSystem> {
        self.forecast_units
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_error(&self) -> Option<&str> {
        self.current_error.as_deref()
    }

    pub fn forecast_error(&self) -> bool {
        self.forecast_error
    }

    pub fn set_unit_system(&mut self, units: UnitSystem) {
        self.view.unit_system = units;
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.view.display_mode = mode;
    }

    pub fn set_online(&mut self, online: bool) {
        self.view.online = online;
    }

    pub fn set_city_input(&mut self, text: &str) {
        self.city_input = text.to_string();
    }

    /// Make `city` the active city and mirror it into the input.
    pub fn set_city(&mut self, city: &str) {
        self.view.city = city.to_string();
        self.city_input = city.to_string();
    }

    /// Empty the suggestion list and invalidate any lookup still in flight.
    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.requests.issue(Resource::Suggestions, self.view.unit_system);
    }

    /// Issue a ticket for `resource` in the selected units.
    ///
    /// A new current-conditions request also supersedes any forecast still
    /// in flight, since that forecast belongs to the previous request.
    pub fn begin(&mut self, resource: Resource) -> Ticket {
        let units = self.view.unit_system;
        if resource == Resource::Current {
            self.loading = true;
            self.requests.issue(Resource::Forecast, units);
        }
        self.requests.issue(resource, units)
    }

    fn accept(&self, ticket: Ticket) -> bool {
        let latest = self.requests.is_latest(ticket);
        if !latest {
            tracing::debug!(
                resource = ?ticket.resource,
                seq = ticket.seq,
                latest = self.requests.latest(ticket.resource),
                "dropping superseded response"
            );
        }
        latest
    }

    pub fn apply_suggestions(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<CitySearchResult>, WeatherError>,
    ) -> SuggestionQuery {
        if !self.accept(ticket) {
            return SuggestionQuery::Superseded;
        }

        match result {
            Ok(cities) => {
                self.suggestions = cities;
                SuggestionQuery::Updated(self.suggestions.len())
            }
            Err(err) => {
                tracing::warn!(error = %err, "city suggestion lookup failed");
                self.suggestions.clear();
                SuggestionQuery::Failed
            }
        }
    }

    /// Store a current-conditions response.
    ///
    /// Returns the coordinate to fetch the forecast for, if the response was
    /// accepted, successful and carried one.
    pub fn apply_current(
        &mut self,
        ticket: Ticket,
        result: Result<CurrentConditions, WeatherError>,
    ) -> Option<Coordinate> {
        if !self.accept(ticket) {
            return None;
        }

        self.loading = false;
        match result {
            Ok(conditions) => {
                let coordinate = conditions.coordinate;
                self.current = Some(conditions);
                self.current_units = Some(ticket.units);
                self.current_error = None;
                coordinate
            }
            Err(err) => {
                tracing::warn!(city = %self.view.city, error = %err, "current conditions fetch failed");
                self.current_error = Some(err.to_string());
                None
            }
        }
    }

    pub fn apply_forecast(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ForecastPoint>, WeatherError>,
    ) -> bool {
        if !self.accept(ticket) {
            return false;
        }

        match result {
            Ok(points) => {
                self.forecast = Some(points);
                self.forecast_units = Some(ticket.units);
                self.forecast_error = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "forecast fetch failed");
                self.forecast_error = true;
            }
        }
        true
    }

    /// Read-only snapshot for rendering.
    pub fn snapshot(&self) -> DashboardView {
        let points = self.forecast.as_deref().unwrap_or_default();

        DashboardView {
            view: self.view.clone(),
            city_input: self.city_input.clone(),
            suggestions: self.suggestions.clone(),
            current: self.current.clone(),
            current_units: self.current_units,
            forecast_units: self.forecast_units,
            daily: aggregate::summarize_daily(points),
            charts: Metric::all()
                .iter()
                .map(|m| ChartSeries::for_metric(*m, points))
                .collect(),
            conditions: aggregate::condition_histogram(points),
            has_forecast: self.forecast.is_some(),
            loading: self.loading,
            current_error: self.current_error.clone(),
            forecast_error: self.forecast_error,
        }
    }
}

/// Everything the presentation layer needs, as plain data.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub view: ViewState,
    pub city_input: String,
    pub suggestions: Vec<CitySearchResult>,
    pub current: Option<CurrentConditions>,
    /// Units of `current`, which can differ from `view.unit_system`.
    pub current_units: Option<UnitSystem>,
    /// Units of the daily summaries and charts.
    pub forecast_units: Option<UnitSystem>,
    pub daily: Vec<DailyForecastSummary>,
    /// Temperature, humidity and wind speed line charts, in that order.
    pub charts: Vec<ChartSeries>,
    pub conditions: ConditionHistogram,
    pub has_forecast: bool,
    pub loading: bool,
    pub current_error: Option<String>,
    pub forecast_error: bool,
}

impl DashboardView {
    pub fn chart(&self, metric: Metric) -> Option<&ChartSeries> {
        self.charts.iter().find(|c| c.metric == metric)
    }
}

/// Drives provider and geolocation calls for one session.
#[derive(Debug)]
pub struct Dashboard<P, G> {
    provider: P,
    geolocation: G,
    state: RefCell<AppState>,
}

impl<P, G> Dashboard<P, G>
where
    P: WeatherProvider,
    G: GeolocationSource,
{
    pub fn new(provider: P, geolocation: G, view: ViewState) -> Self {
        Self::with_state(provider, geolocation, AppState::new(view))
    }

    pub fn with_state(provider: P, geolocation: G, state: AppState) -> Self {
        Self {
            provider,
            geolocation,
            state: RefCell::new(state),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn view(&self) -> DashboardView {
        self.state.borrow().snapshot()
    }

    pub fn view_state(&self) -> ViewState {
        self.state.borrow().view_state().clone()
    }

    /// Fetch current conditions for the active city, then its forecast.
    pub async fn refresh(&self) {
        let (ticket, city, units) = {
            let mut state = self.state.borrow_mut();
            let view = state.view_state();
            let (city, units) = (view.city.clone(), view.unit_system);
            (state.begin(Resource::Current), city, units)
        };

        tracing::debug!(%city, %units, "fetching current conditions");
        let result = self.provider.fetch_current(&city, units).await;

        let coordinate = self.state.borrow_mut().apply_current(ticket, result);
        if let Some(coordinate) = coordinate {
            self.fetch_forecast(coordinate, units).await;
        }
    }

    async fn fetch_forecast(&self, coordinate: Coordinate, units: UnitSystem) {
        let ticket = self.state.borrow_mut().begin(Resource::Forecast);

        tracing::debug!(%coordinate, %units, "fetching forecast");
        let result = self.provider.fetch_forecast(coordinate, units).await;

        self.state.borrow_mut().apply_forecast(ticket, result);
    }

    /// Switch units and re-fetch everything for the same city.
    pub async fn set_unit_system(&self, units: UnitSystem) {
        {
            let mut state = self.state.borrow_mut();
            if state.view_state().unit_system == units {
                return;
            }
            state.set_unit_system(units);
        }
        self.refresh().await;
    }

    pub async fn toggle_unit_system(&self) {
        let next = self.state.borrow().view_state().unit_system.toggled();
        self.set_unit_system(next).await;
    }

    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.state.borrow_mut().set_display_mode(mode);
    }

    /// Connectivity is display-only; fetches are unaffected.
    pub fn set_online(&self, online: bool) {
        tracing::info!(online, "connectivity changed");
        self.state.borrow_mut().set_online(online);
    }

    /// Update the city input and the suggestion list that goes with it.
    pub async fn edit_city_text(&self, text: &str) -> SuggestionQuery {
        let ticket = {
            let mut state = self.state.borrow_mut();
            state.set_city_input(text);

            if text.chars().count() <= MIN_SUGGESTION_QUERY_CHARS {
                state.clear_suggestions();
                return SuggestionQuery::Skipped;
            }
            state.begin(Resource::Suggestions)
        };

        let result = self.provider.find_cities(text).await;
        self.state.borrow_mut().apply_suggestions(ticket, result)
    }

    /// Make the typed text the active city and fetch it.
    pub async fn submit_city(&self) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let city = state.city_input().trim().to_string();
            if city.is_empty() {
                tracing::debug!("ignoring empty city submission");
                return false;
            }
            state.set_city(&city);
            state.clear_suggestions();
        }
        self.refresh().await;
        true
    }

    pub async fn select_suggestion(&self, index: usize) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let Some(city) = state.suggestions().get(index).map(|c| c.name.clone()) else {
                tracing::warn!(index, "suggestion index out of range");
                return false;
            };
            state.set_city(&city);
            state.clear_suggestions();
        }
        self.refresh().await;
        true
    }

    /// Locate the user, name the nearest city and show it.
    ///
    /// Any failure is logged and leaves the state untouched.
    pub async fn use_current_location(&self) -> Result<String, LocateError> {
        let city = match self.locate().await {
            Ok(city) => city,
            Err(err) => {
                tracing::warn!(error = %err, "use current location failed");
                return Err(err);
            }
        };

        tracing::info!(%city, "located user");
        self.state.borrow_mut().set_city(&city);
        self.refresh().await;
        Ok(city)
    }

    async fn locate(&self) -> Result<String, LocateError> {
        let coordinate = self.geolocation.request_current_position().await?;
        Ok(self.provider.resolve_city_name(coordinate).await?)
    }
}
