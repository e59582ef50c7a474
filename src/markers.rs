//! Distance markers along a segment.
//!
//! Markers sit at every multiple of the interval strictly below the segment
//! length. Positions are interpolated linearly in lat/lon, then projected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GpxArtError;
use crate::model::Segment;
use crate::projection::project_clamped;

type Result<T> = std::result::Result<T, GpxArtError>;

const KM_PER_METER: f64 = 0.001;
const MILES_PER_METER: f64 = 0.000_621_371;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "km", alias = "kilometers")]
    Kilometers,
    #[default]
    #[serde(rename = "miles", alias = "mi")]
    Miles,
}

impl DistanceUnit {
    /// Multiply meters by this to get the unit.
    pub fn per_meter(self) -> f64 {
        match self {
            Self::Kilometers => KM_PER_METER,
            Self::Miles => MILES_PER_METER,
        }
    }

    pub fn from_meters(self, meters: f64) -> f64 {
        meters * self.per_meter()
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Miles => "mi",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = GpxArtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" => Ok(Self::Kilometers),
            "miles" | "mi" => Ok(Self::Miles),
            _ => Err(GpxArtError::UnknownValue {
                kind: "markers unit",
                value: s.to_string(),
                expected: "km, miles",
            }),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kilometers => f.write_str("km"),
            Self::Miles => f.write_str("miles"),
        }
    }
}

/// A validated unit + interval pair. The only way to get one is through
/// [`MarkerSpacing::new`], so placement itself never fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSpacing {
    unit: DistanceUnit,
    interval: f64,
}

impl MarkerSpacing {
    pub fn new(unit: DistanceUnit, interval: f64) -> Result<Self> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(GpxArtError::InvalidInterval(interval));
        }
        Ok(Self { unit, interval })
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }
}

/// A marker in projected coordinates, labelled with its distance along the
/// segment in the spacing's unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub distance: f64,
}

impl Marker {
    /// Label text such as `1 km` or `2.5 mi`.
    pub fn label(&self, unit: DistanceUnit) -> String {
        format!("{} {}", format_trimmed(self.distance), unit.abbreviation())
    }
}

fn format_trimmed(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Cumulative distance along the segment at every point, in meters.
pub fn cumulative_distances(segment: &Segment) -> Vec<f64> {
    let points = segment.points();
    let mut cum = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            total += points[i - 1].distance_to(p);
        }
        cum.push(total);
    }
    cum
}

/// `interval, 2*interval, ...` while strictly below `total`. A marker that
/// would land exactly on the end is not produced.
pub fn marker_targets(total: f64, interval: f64) -> impl Iterator<Item = f64> {
    (1u64..)
        .map(move |k| k as f64 * interval)
        .take_while(move |&target| target < total)
}

/// Place markers along `segment`. Fewer than two points, or zero length,
/// yields no markers.
pub fn place_markers(segment: &Segment, spacing: &MarkerSpacing) -> Vec<Marker> {
    let points = segment.points();
    if points.len() < 2 {
        return Vec::new();
    }

    let factor = spacing.unit.per_meter();
    let cum: Vec<f64> = cumulative_distances(segment)
        .into_iter()
        .map(|m| m * factor)
        .collect();
    let total = cum[cum.len() - 1];

    let mut markers = Vec::new();
    // Targets ascend, so the first bracketing pair never moves backwards.
    let mut start = 1;
    for target in marker_targets(total, spacing.interval) {
        let Some(i) = (start..cum.len()).find(|&i| cum[i - 1] <= target && target <= cum[i]) else {
            continue;
        };
        start = i;
        let span = cum[i] - cum[i - 1];
        let ratio = if span > 0.0 {
            (target - cum[i - 1]) / span
        } else {
            0.0
        };

        let (a, b) = (&points[i - 1], &points[i]);
        let lat = a.latitude() + ratio * (b.latitude() - a.latitude());
        let lon = a.longitude() + ratio * (b.longitude() - a.longitude());
        let (x, y) = project_clamped(lat, lon);
        markers.push(Marker {
            x,
            y,
            distance: target,
        });
    }

    tracing::debug!(
        count = markers.len(),
        total,
        unit = %spacing.unit,
        "placed distance markers"
    );
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::EARTH_RADIUS_M;
    use crate::model::Point;
    use crate::projection::project;

    /// Degrees of longitude on the equator covering `km` kilometers.
    fn equator_degrees(km: f64) -> f64 {
        (km * 1000.0 / EARTH_RADIUS_M).to_degrees()
    }

    fn equator_segment(lons: &[f64]) -> Segment {
        Segment::new(
            lons.iter().map(|&lon| Point::new(0.0, lon).unwrap()).collect(),
            None,
        )
    }

    fn km(interval: f64) -> MarkerSpacing {
        MarkerSpacing::new(DistanceUnit::Kilometers, interval).unwrap()
    }

    #[test]
    fn test_targets_exclude_exact_end() {
        let targets: Vec<f64> = marker_targets(3.0, 1.0).collect();
        assert_eq!(targets, vec![1.0, 2.0]);
        assert_eq!(marker_targets(0.0, 1.0).count(), 0);
        assert_eq!(marker_targets(0.5, 1.0).count(), 0);
    }

    #[test]
    fn test_three_km_segment_gets_two_markers() {
        // Just short of 3 km so float noise cannot push a third marker in.
        let end = equator_degrees(2.9999);
        let seg = equator_segment(&[0.0, end / 3.0, 2.0 * end / 3.0, end]);
        let markers = place_markers(&seg, &km(1.0));
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].distance, 1.0);
        assert_eq!(markers[1].distance, 2.0);
    }

    #[test]
    fn test_marker_exactly_at_segment_end_is_dropped() {
        let seg = equator_segment(&[0.0, equator_degrees(1.5), equator_degrees(3.0)]);
        let total = cumulative_distances(&seg)[2] * DistanceUnit::Kilometers.per_meter();

        // Halving and quartering are exact, so the last target equals `total`.
        let halves = place_markers(&seg, &km(total / 2.0));
        assert_eq!(halves.len(), 1);
        assert_eq!(halves[0].distance, total / 2.0);

        let quarters = place_markers(&seg, &km(total / 4.0));
        assert_eq!(quarters.len(), 3);
        assert!(quarters.iter().all(|m| m.distance < total));

        assert!(place_markers(&seg, &km(total)).is_empty());
    }

    #[test]
    fn test_marker_positions_are_interpolated_and_projected() {
        let end = equator_degrees(2.5);
        let seg = equator_segment(&[0.0, end]);
        let markers = place_markers(&seg, &km(1.0));
        assert_eq!(markers.len(), 2);

        let (x1, y1) = project(0.0, equator_degrees(1.0));
        assert!((markers[0].x - x1).abs() < 1e-9);
        assert!((markers[0].y - y1).abs() < 1e-12);
        let (x2, _) = project(0.0, equator_degrees(2.0));
        assert!((markers[1].x - x2).abs() < 1e-9);
    }

    #[test]
    fn test_miles() {
        // 5 km is ~3.107 miles: markers at 1, 2, 3.
        let seg = equator_segment(&[0.0, equator_degrees(5.0)]);
        let spacing = MarkerSpacing::new(DistanceUnit::Miles, 1.0).unwrap();
        let distances: Vec<f64> = place_markers(&seg, &spacing).iter().map(|m| m.distance).collect();
        assert_eq!(distances, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zero_length_segment_has_no_markers() {
        let seg = equator_segment(&[10.0, 10.0, 10.0]);
        assert!(place_markers(&seg, &km(0.001)).is_empty());
    }

    #[test]
    fn test_short_segments_have_no_markers() {
        assert!(place_markers(&Segment::default(), &km(1.0)).is_empty());
        assert!(place_markers(&equator_segment(&[1.0]), &km(1.0)).is_empty());
    }

    #[test]
    fn test_repeated_point_keeps_bracketing_sane() {
        // A repeated point in the middle creates a zero-length pair.
        let half = equator_degrees(1.0);
        let seg = equator_segment(&[0.0, half, half, 1.5 * half]);
        let markers = place_markers(&seg, &km(1.0));
        assert_eq!(markers.len(), 1);
        let (x, _) = project(0.0, half);
        assert!((markers[0].x - x).abs() < 1e-6);
    }

    #[test]
    fn test_spacing_rejects_bad_intervals() {
        assert!(matches!(
            MarkerSpacing::new(DistanceUnit::Kilometers, 0.0),
            Err(GpxArtError::InvalidInterval(_))
        ));
        assert!(MarkerSpacing::new(DistanceUnit::Miles, -1.0).is_err());
        assert!(MarkerSpacing::new(DistanceUnit::Miles, f64::NAN).is_err());
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("km".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert_eq!("Miles".parse::<DistanceUnit>().unwrap(), DistanceUnit::Miles);
        assert!(matches!(
            "furlongs".parse::<DistanceUnit>(),
            Err(GpxArtError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_labels() {
        let m = Marker { x: 0.0, y: 0.0, distance: 2.0 };
        assert_eq!(m.label(DistanceUnit::Kilometers), "2 km");
        let m = Marker { x: 0.0, y: 0.0, distance: 1.5 };
        assert_eq!(m.label(DistanceUnit::Miles), "1.5 mi");
    }

    #[test]
    fn test_cumulative_distances() {
        let seg = equator_segment(&[0.0, 1.0, 3.0]);
        let cum = cumulative_distances(&seg);
        assert_eq!(cum.len(), 3);
        assert_eq!(cum[0], 0.0);
        assert!((cum[2] - 3.0 * cum[1]).abs() < 1e-6);
    }
}
