//! Terminal rendering of a `DashboardView`.

use std::fmt;

use weather_dashboard_core::{
    ChartSeries, CitySearchResult, ConditionHistogram, DashboardView, DisplayMode, Metric,
    UnitSystem, aggregate::day_label,
};

const BAR_WIDTH: usize = 40;

/// The whole dashboard: status line, current panel and the active chart.
pub struct Panel<'a>(pub &'a DashboardView);

impl fmt::Display for Panel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        let status = if view.view.online { "online" } else { "offline" };
        let selected = units_label(view.view.unit_system);
        writeln!(f, "[{status}] {selected} | {}", view.view.display_mode)?;

        if view.loading {
            writeln!(f, "Loading...")?;
        }

        if let Some(err) = &view.current_error {
            writeln!(f, "Error fetching weather for {}: {err}", view.view.city)?;
        }

        if let Some(current) = &view.current {
            // Readings keep the units they were fetched in, even if a later
            // unit change failed to refetch them.
            let units = view.current_units.unwrap_or(view.view.unit_system);
            writeln!(f)?;
            writeln!(f, "  {}", current.city_name)?;
            writeln!(f, "  {}{}", round_half_up(current.temperature), units.temperature_symbol())?;
            writeln!(f, "  {}", current.description)?;
            writeln!(f, "  Humidity: {}%", current.humidity)?;
            writeln!(f, "  Wind Speed: {} {}", current.wind_speed, units.wind_speed_unit())?;
        }

        if view.forecast_error {
            writeln!(f, "\nError fetching forecast data.")?;
        }

        if view.has_forecast {
            writeln!(f)?;
            match view.view.display_mode {
                DisplayMode::Forecast => write_daily(f, view)?,
                DisplayMode::TempGraph => write_metric(f, view, Metric::Temperature)?,
                DisplayMode::HumidityGraph => write_metric(f, view, Metric::Humidity)?,
                DisplayMode::WindGraph => write_metric(f, view, Metric::WindSpeed)?,
                DisplayMode::ConditionsPie => write!(f, "{}", ConditionsChart(&view.conditions))?,
            }
        }

        Ok(())
    }
}

/// Horizontal bars scaled to the largest magnitude in the series.
pub struct LineChart<'a> {
    pub series: &'a ChartSeries,
    pub unit: &'a str,
}

impl fmt::Display for LineChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.series.title)?;

        let max = self
            .series
            .points
            .iter()
            .map(|p| p.value.abs())
            .fold(0.0_f64, f64::max);

        for point in &self.series.points {
            let len = if max > 0.0 {
                ((point.value.abs() / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            writeln!(
                f,
                "{:<16} {:<width$} {}{}",
                point.label,
                "#".repeat(len),
                point.value,
                self.unit,
                width = BAR_WIDTH,
            )?;
        }

        Ok(())
    }
}

pub struct ConditionsChart<'a>(pub &'a ConditionHistogram);

impl fmt::Display for ConditionsChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let histogram = self.0;
        writeln!(f, "Weather Conditions")?;

        for (name, share) in histogram.shares() {
            let len = ((share / 100.0) * BAR_WIDTH as f64).round() as usize;
            let count = histogram.get(name).unwrap_or_default();
            writeln!(
                f,
                "{:<14} {:<width$} {:>5.1}% ({count})",
                name,
                "*".repeat(len),
                share,
                width = BAR_WIDTH,
            )?;
        }

        Ok(())
    }
}

pub struct Suggestions<'a>(pub &'a [CitySearchResult]);

impl fmt::Display for Suggestions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No matching cities.");
        }

        for city in self.0 {
            writeln!(f, "{city}  ({})", city.coordinate)?;
        }

        Ok(())
    }
}

fn units_label(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "Celsius (°C)",
        UnitSystem::Imperial => "Fahrenheit (°F)",
    }
}

fn forecast_units(view: &DashboardView) -> UnitSystem {
    view.forecast_units.unwrap_or(view.view.unit_system)
}

fn write_daily(f: &mut fmt::Formatter<'_>, view: &DashboardView) -> fmt::Result {
    let symbol = forecast_units(view).temperature_symbol();

    for day in &view.daily {
        writeln!(
            f,
            "{}  Temperature: {:.1}{}  Weather: {}",
            day_label(day.date),
            day.average_temperature,
            symbol,
            day.representative_condition,
        )?;
    }

    Ok(())
}

fn write_metric(f: &mut fmt::Formatter<'_>, view: &DashboardView, metric: Metric) -> fmt::Result {
    let units = forecast_units(view);
    let unit = match metric {
        Metric::Temperature => units.temperature_symbol(),
        Metric::Humidity => "%",
        Metric::WindSpeed => units.wind_speed_unit(),
    };

    match view.chart(metric) {
        Some(series) => write!(f, "{}", LineChart { series, unit }),
        None => Ok(()),
    }
}

/// Nearest integer with halves rounded up, so -2.5 shows as -2. Never
/// yields negative zero.
fn round_half_up(value: f64) -> f64 {
    let rounded = (value + 0.5).floor();
    if rounded == 0.0 { 0.0 } else { rounded }
}
