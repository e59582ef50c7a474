use chrono::SecondsFormat;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue};

use crate::model::{Point, Route, Segment};

/// Convert a route to a GeoJSON FeatureCollection: one feature per non-empty
/// segment, with the route's own metrics as foreign members.
pub fn route_to_feature_collection(route: &Route) -> FeatureCollection {
    let features: Vec<Feature> = route
        .segments()
        .iter()
        .enumerate()
        .filter(|(_, seg)| !seg.is_empty())
        .map(|(index, seg)| segment_to_feature(index, seg))
        .collect();

    let bounds = route.bounds();
    let bbox = (!features.is_empty()).then(|| {
        vec![bounds.min_lon, bounds.min_lat, bounds.max_lon, bounds.max_lat]
    });

    let mut foreign = Map::new();
    insert_optional(&mut foreign, "name", route.name());
    insert_number(&mut foreign, "distanceM", route.total_distance());
    if let Some(d) = route.total_duration() {
        foreign.insert("durationS".to_string(), JsonValue::Number(d.num_seconds().into()));
    }
    if !route.metadata().is_empty() {
        let meta: Map<String, JsonValue> = route
            .metadata()
            .iter()
            .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
            .collect();
        foreign.insert("metadata".to_string(), JsonValue::Object(meta));
    }

    FeatureCollection {
        bbox,
        features,
        foreign_members: Some(foreign),
    }
}

fn segment_to_feature(index: usize, seg: &Segment) -> Feature {
    let geometry = if seg.len() == 1 {
        Geometry::new(Value::Point(point_coords(&seg.points()[0])))
    } else {
        Geometry::new(Value::LineString(seg.points().iter().map(point_coords).collect()))
    };

    let mut props = Map::new();
    props.insert("segment".to_string(), JsonValue::Number(index.into()));
    insert_optional(&mut props, "name", seg.name());
    insert_number(&mut props, "distanceM", seg.total_distance());
    if let Some(d) = seg.duration() {
        props.insert("durationS".to_string(), JsonValue::Number(d.num_seconds().into()));
    }
    insert_coordinate_times(&mut props, seg.points());

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// GeoJSON position: longitude first, elevation only when known.
fn point_coords(pt: &Point) -> Vec<f64> {
    match pt.elevation() {
        Some(ele) => vec![pt.longitude(), pt.latitude(), ele],
        None => vec![pt.longitude(), pt.latitude()],
    }
}

fn insert_optional(props: &mut Map<String, JsonValue>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        props.insert(key.to_string(), JsonValue::String(v.to_string()));
    }
}

fn insert_number(props: &mut Map<String, JsonValue>, key: &str, value: f64) {
    if let Some(n) = Number::from_f64(value) {
        props.insert(key.to_string(), JsonValue::Number(n));
    }
}

/// `coordinateProperties.times`, parallel to the coordinates. Left out when
/// no point in the segment is stamped.
fn insert_coordinate_times(props: &mut Map<String, JsonValue>, points: &[Point]) {
    if points.iter().all(|pt| pt.timestamp().is_none()) {
        return;
    }
    let times = points
        .iter()
        .map(|pt| {
            pt.timestamp().map_or(JsonValue::Null, |t| {
                JsonValue::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            })
        })
        .collect();
    props.insert(
        "coordinateProperties".to_string(),
        serde_json::json!({ "times": JsonValue::Array(times) }),
    );
}
