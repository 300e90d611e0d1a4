//! Derived views over a raw 3-hour forecast: daily summaries, per-metric
//! chart series and the condition histogram.
//!
//! Everything here is pure and recomputed from the point list on demand.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::model::{DailyForecastSummary, ForecastPoint};

/// Maximum number of days in the daily summary.
pub const DAILY_SUMMARY_LIMIT: usize = 6;

/// Default number of raw points plotted in a line chart.
pub const CHART_POINT_LIMIT: usize = 6;

const UNKNOWN_CONDITION: &str = "Unknown";

/// Metric plotted by a line chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Humidity,
    WindSpeed,
}

impl Metric {
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::WindSpeed => "Wind Speed",
        }
    }

    pub fn value(&self, point: &ForecastPoint) -> f64 {
        match self {
            Metric::Temperature => point.temperature,
            Metric::Humidity => f64::from(point.humidity),
            Metric::WindSpeed => point.wind_speed,
        }
    }

    pub const fn all() -> &'static [Metric] {
        &[Metric::Temperature, Metric::Humidity, Metric::WindSpeed]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// A titled line-chart dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub metric: Metric,
    pub title: &'static str,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    pub fn for_metric(metric: Metric, points: &[ForecastPoint]) -> Self {
        Self {
            metric,
            title: metric.title(),
            points: series_for(metric, points, CHART_POINT_LIMIT),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Occurrences of each condition category, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConditionHistogram {
    entries: Vec<(String, usize)>,
}

impl ConditionHistogram {
    pub fn get(&self, condition: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == condition)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Share of each category as a percentage of all counted points.
    pub fn shares(&self) -> Vec<(&str, f64)> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }

        self.iter()
            .map(|(name, count)| (name, count as f64 * 100.0 / total as f64))
            .collect()
    }

    fn record(&mut self, condition: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == condition) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((condition.to_string(), 1)),
        }
    }
}

/// Human-readable day string used for chart labels, e.g. `Mon Oct 19 2026`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Collapse the forecast into at most [`DAILY_SUMMARY_LIMIT`] days.
///
/// Days keep the order in which they are first encountered. The condition of
/// each day is the description of the first point seen for it.
pub fn summarize_daily(points: &[ForecastPoint]) -> Vec<DailyForecastSummary> {
    struct Bucket<'a> {
        date: NaiveDate,
        sum: f64,
        count: usize,
        condition: Option<&'a str>,
    }

    let mut buckets: Vec<Bucket<'_>> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for point in points {
        let date = point.timestamp.date();
        let slot = *index.entry(date).or_insert_with(|| {
            buckets.push(Bucket {
                date,
                sum: 0.0,
                count: 0,
                condition: point.condition_description.as_deref(),
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.sum += point.temperature;
        bucket.count += 1;
    }

    buckets
        .into_iter()
        .take(DAILY_SUMMARY_LIMIT)
        .map(|b| DailyForecastSummary {
            date: b.date,
            average_temperature: round_one_decimal(b.sum / b.count as f64),
            representative_condition: b.condition.unwrap_or(UNKNOWN_CONDITION).to_string(),
        })
        .collect()
}

/// Raw readings of `metric` for the first `limit` points, labelled by day.
pub fn series_for(metric: Metric, points: &[ForecastPoint], limit: usize) -> Vec<SeriesPoint> {
    points
        .iter()
        .take(limit)
        .map(|p| SeriesPoint {
            label: day_label(p.timestamp.date()),
            value: metric.value(p),
        })
        .collect()
}

/// Count points per condition category over the whole sequence.
pub fn condition_histogram(points: &[ForecastPoint]) -> ConditionHistogram {
    let mut histogram = ConditionHistogram::default();

    for condition in points.iter().filter_map(|p| p.condition_main.as_deref()) {
        if !condition.is_empty() {
            histogram.record(condition);
        }
    }

    histogram
}

/// Round half away from zero to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn point(ts: &str, temp: f64, main: Option<&str>, desc: Option<&str>) -> ForecastPoint {
        ForecastPoint {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            temperature: temp,
            humidity: 50,
            wind_speed: 2.0,
            condition_main: main.map(str::to_string),
            condition_description: desc.map(str::to_string),
        }
    }

    fn two_day_series() -> Vec<ForecastPoint> {
        vec![
            point("2026-10-19 15:00:00", 20.0, Some("Clear"), Some("clear sky")),
            point("2026-10-19 18:00:00", 22.0, Some("Clouds"), Some("few clouds")),
            point("2026-10-19 21:00:00", 24.0, Some("Clouds"), Some("few clouds")),
            point("2026-10-20 00:00:00", 18.0, Some("Rain"), Some("light rain")),
            point("2026-10-20 03:00:00", 19.0, Some("Rain"), Some("moderate rain")),
        ]
    }

    #[test]
    fn daily_summary_averages_per_day() {
        let days = summarize_daily(&two_day_series());

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(days[0].average_temperature, 22.0);
        assert_eq!(days[1].average_temperature, 18.5);
    }

    #[test]
    fn daily_summary_takes_first_condition_of_day() {
        let days = summarize_daily(&two_day_series());

        assert_eq!(days[0].representative_condition, "clear sky");
        assert_eq!(days[1].representative_condition, "light rain");
    }

    #[test]
    fn daily_summary_of_empty_is_empty() {
        assert!(summarize_daily(&[]).is_empty());
    }

    #[test]
    fn daily_summary_truncates_to_six_days() {
        let points: Vec<ForecastPoint> = (1..=8)
            .map(|d| point(&format!("2026-11-{d:02} 12:00:00"), d as f64, None, None))
            .collect();

        let days = summarize_daily(&points);
        assert_eq!(days.len(), DAILY_SUMMARY_LIMIT);
        assert_eq!(days[5].date, NaiveDate::from_ymd_opt(2026, 11, 6).unwrap());
        assert_eq!(days[0].representative_condition, "Unknown");
    }

    #[test]
    fn daily_summary_keeps_encounter_order() {
        let points = vec![
            point("2026-10-21 00:00:00", 10.0, None, Some("a")),
            point("2026-10-20 00:00:00", 12.0, None, Some("b")),
            point("2026-10-21 03:00:00", 14.0, None, Some("c")),
        ];

        let days = summarize_daily(&points);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
        assert_eq!(days[0].average_temperature, 12.0);
        assert_eq!(days[0].representative_condition, "a");
    }

    #[test]
    fn average_rounds_half_away_from_zero() {
        let points = vec![
            point("2026-10-19 00:00:00", 1.0, None, None),
            point("2026-10-19 03:00:00", 1.5, None, None),
        ];
        assert_eq!(summarize_daily(&points)[0].average_temperature, 1.3);

        let negative = vec![
            point("2026-10-19 00:00:00", -1.0, None, None),
            point("2026-10-19 03:00:00", -1.5, None, None),
        ];
        assert_eq!(summarize_daily(&negative)[0].average_temperature, -1.3);
    }

    #[test]
    fn series_uses_raw_points() {
        let series = series_for(Metric::Temperature, &two_day_series(), 4);

        assert_eq!(series.len(), 4);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![20.0, 22.0, 24.0, 18.0]);
        assert_eq!(series[0].label, "Mon Oct 19 2026");
        assert_eq!(series[3].label, "Tue Oct 20 2026");
    }

    #[test]
    fn series_never_exceeds_limit() {
        let points = two_day_series();
        assert_eq!(series_for(Metric::Humidity, &points, 2).len(), 2);
        assert_eq!(series_for(Metric::WindSpeed, &points, 100).len(), points.len());
        assert!(series_for(Metric::WindSpeed, &points, 0).is_empty());
    }

    #[test]
    fn chart_series_is_titled() {
        let chart = ChartSeries::for_metric(Metric::WindSpeed, &two_day_series());
        assert_eq!(chart.title, "Wind Speed");
        assert_eq!(chart.points.len(), 5);
        assert_eq!(chart.points[0].value, 2.0);
    }

    #[test]
    fn histogram_counts_whole_sequence() {
        let mut points = two_day_series();
        points.push(point("2026-10-25 00:00:00", 0.0, Some("Clear"), None));
        points.push(point("2026-10-25 03:00:00", 0.0, None, None));

        let hist = condition_histogram(&points);

        assert_eq!(hist.get("Clear"), Some(2));
        assert_eq!(hist.get("Clouds"), Some(2));
        assert_eq!(hist.get("Rain"), Some(2));
        assert_eq!(hist.get("Snow"), None);
        assert_eq!(hist.total(), 6);

        let order: Vec<&str> = hist.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["Clear", "Clouds", "Rain"]);
    }

    #[test]
    fn histogram_shares_sum_to_hundred() {
        let hist = condition_histogram(&two_day_series());
        let sum: f64 = hist.shares().iter().map(|(_, pct)| pct).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!(condition_histogram(&[]).shares().is_empty());
    }
}
