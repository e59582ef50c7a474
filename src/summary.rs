//! Human-readable route figures, shared by the `info` command, the overlay
//! and the wasm summary.

use chrono::Duration;
use serde::Serialize;

use crate::model::{Bounds, ElevationStats, Route};

const METERS_PER_MILE: f64 = 1609.34;

/// `12.34 km (7.67 miles)`
pub fn format_distance(meters: f64) -> String {
    format!(
        "{:.2} km ({:.2} miles)",
        meters / 1000.0,
        meters / METERS_PER_MILE
    )
}

/// `1 hour, 5 minutes`; seconds only shown for runs under an hour.
pub fn format_duration(duration: Option<Duration>) -> String {
    let Some(duration) = duration.filter(|d| *d > Duration::zero()) else {
        return "Unknown".to_string();
    };

    let total = duration.num_seconds();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    let mut push = |n: i64, unit: &str| {
        parts.push(format!("{n} {unit}{}", if n == 1 { "" } else { "s" }));
    };
    if days > 0 {
        push(days, "day");
    }
    if hours > 0 {
        push(hours, "hour");
    }
    if minutes > 0 {
        push(minutes, "minute");
    }
    if seconds > 0 && days == 0 && hours == 0 {
        push(seconds, "second");
    }
    parts.join(", ")
}

pub fn format_elevation(stats: Option<&ElevationStats>) -> String {
    match stats {
        Some(s) => format!(
            "Min: {:.1}m, Max: {:.1}m, Gain: {:.1}m, Loss: {:.1}m",
            s.min, s.max, s.gain, s.loss
        ),
        None => "No elevation data available".to_string(),
    }
}

pub fn format_bounds(bounds: &Bounds) -> String {
    format!(
        "Latitude: {:.6}° to {:.6}°, Longitude: {:.6}° to {:.6}°",
        bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
    )
}

/// Serializable snapshot of a route's derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub name: Option<String>,
    pub distance_m: f64,
    pub duration_s: Option<i64>,
    pub segments: usize,
    pub points: usize,
    pub bounds: Bounds,
    pub elevation: Option<ElevationStats>,
}

impl RouteSummary {
    pub fn from_route(route: &Route) -> Self {
        Self {
            name: route.name().map(str::to_string),
            distance_m: route.total_distance(),
            duration_s: route.total_duration().map(|d| d.num_seconds()),
            segments: route.segments().len(),
            points: route.total_points(),
            bounds: route.bounds(),
            elevation: route.elevation_stats(),
        }
    }
}
