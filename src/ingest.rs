//! Turns a raw [`GpxData`] document into a validated [`Route`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::GpxArtError;
use crate::gpx_types::{GpxData, GpxPoint};
use crate::model::{Point, Route, Segment};
use crate::parser::parse_gpx;

type Result<T> = std::result::Result<T, GpxArtError>;

pub const WAYPOINT_SEGMENT_NAME: &str = "Waypoints";

/// Parse GPX text straight into a [`Route`].
pub fn route_from_gpx(xml: &str) -> Result<Route> {
    to_route(&parse_gpx(xml)?)
}

/// Segment order: track segments, then GPX routes, then all waypoints as one
/// trailing segment. The route name is the first named track, falling back
/// to the first named GPX route.
pub fn to_route(data: &GpxData) -> Result<Route> {
    let mut segments = Vec::new();
    let mut route_name: Option<String> = None;

    for track in &data.tracks {
        if route_name.is_none() {
            route_name = track.name.clone();
        }
        for seg in &track.segments {
            segments.push(Segment::new(convert_points(&seg.points)?, track.name.clone()));
        }
    }

    for rte in data.routes.iter().filter(|r| !r.points.is_empty()) {
        segments.push(Segment::new(convert_points(&rte.points)?, rte.name.clone()));
        if route_name.is_none() {
            route_name = rte.name.clone();
        }
    }

    if !data.waypoints.is_empty() {
        segments.push(Segment::new(
            convert_points(&data.waypoints)?,
            Some(WAYPOINT_SEGMENT_NAME.to_string()),
        ));
    }

    let route = Route::new(segments, route_name, extract_metadata(data));
    tracing::debug!(
        segments = route.segments().len(),
        points = route.total_points(),
        name = route.name().unwrap_or("-"),
        "built route"
    );
    Ok(route)
}

fn convert_points(points: &[GpxPoint]) -> Result<Vec<Point>> {
    points.iter().map(convert_point).collect()
}

fn convert_point(pt: &GpxPoint) -> Result<Point> {
    let point = Point::new(pt.lat, pt.lon)?
        .with_elevation(pt.ele)
        .with_timestamp(pt.time.as_deref().and_then(parse_timestamp));
    Ok(point)
}

/// RFC 3339 timestamp as used by GPX. Unparseable text is dropped.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(text.trim()) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(err) => {
            tracing::warn!(%err, text, "ignoring unparseable timestamp");
            None
        }
    }
}

fn extract_metadata(data: &GpxData) -> BTreeMap<String, String> {
    let meta = &data.metadata;
    [
        ("name", &meta.name),
        ("description", &meta.desc),
        ("author", &meta.author),
        ("time", &meta.time),
        ("keywords", &meta.keywords),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
    .collect()
}
