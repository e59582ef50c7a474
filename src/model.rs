//! Route data model: points, segments and routes, with derived metrics.
//!
//! Everything here is immutable once built. Metrics are recomputed on every
//! call; segments are expected to stay in the ~10^4 point range.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::GpxArtError;
use crate::geodesy::haversine_distance;

type Result<T> = std::result::Result<T, GpxArtError>;

/// A single recorded position.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
}

impl Point {
    /// Build a point, rejecting coordinates outside [-90, 90] / [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GpxArtError::CoordinateOutOfRange {
                field: "Latitude",
                value: latitude,
                min: -90.0,
                max: 90.0,
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GpxArtError::CoordinateOutOfRange {
                field: "Longitude",
                value: longitude,
                min: -180.0,
                max: 180.0,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            elevation: None,
            timestamp: None,
        })
    }

    pub fn with_elevation(mut self, elevation: Option<f64>) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Point) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// One continuous recording. Point order is traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    points: Vec<Point>,
    name: Option<String>,
}

impl Segment {
    pub fn new(points: Vec<Point>, name: Option<String>) -> Self {
        Self { points, name }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of consecutive haversine distances, in meters. Zero for fewer than
    /// two points.
    pub fn total_distance(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .fold(0.0, |acc, d| acc + d)
    }

    /// Time between the first and the last timestamped point, in document
    /// order. `None` with fewer than two points or no timestamps at all.
    pub fn duration(&self) -> Option<Duration> {
        if self.points.len() < 2 {
            return None;
        }
        let mut stamped = self.points.iter().filter_map(Point::timestamp);
        let first = stamped.next()?;
        let last = stamped.last().unwrap_or(first);
        Some(last - first)
    }
}

/// Axis-aligned lat/lon rectangle. All zeros when there are no points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min_lat: 0.0,
        max_lat: 0.0,
        min_lon: 0.0,
        max_lon: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationStats {
    pub min: f64,
    pub max: f64,
    pub gain: f64,
    pub loss: f64,
}

/// A complete GPS track: ordered segments plus name and free-form metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    segments: Vec<Segment>,
    name: Option<String>,
    metadata: BTreeMap<String, String>,
}

impl Route {
    pub fn new(
        segments: Vec<Segment>,
        name: Option<String>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            segments,
            name,
            metadata,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Every point of every segment, in document order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.segments.iter().flat_map(|s| s.points.iter())
    }

    pub fn total_distance(&self) -> f64 {
        self.segments
            .iter()
            .map(Segment::total_distance)
            .fold(0.0, |acc, d| acc + d)
    }

    /// Span between the globally earliest and latest timestamp.
    pub fn total_duration(&self) -> Option<Duration> {
        let mut stamps = self.points().filter_map(Point::timestamp);
        let first = stamps.next()?;
        let (min, max) = stamps.fold((first, first), |(min, max), t| (min.min(t), max.max(t)));
        Some(max - min)
    }

    /// Earliest timestamp anywhere in the route.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.points().filter_map(Point::timestamp).min()
    }

    pub fn bounds(&self) -> Bounds {
        let mut points = self.points();
        let Some(first) = points.next() else {
            return Bounds::EMPTY;
        };
        let init = Bounds {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lon: first.longitude,
            max_lon: first.longitude,
        };
        points.fold(init, |b, p| Bounds {
            min_lat: b.min_lat.min(p.latitude),
            max_lat: b.max_lat.max(p.latitude),
            min_lon: b.min_lon.min(p.longitude),
            max_lon: b.max_lon.max(p.longitude),
        })
    }

    /// Elevation min/max and cumulative gain/loss over every point that has
    /// an elevation.
    ///
    /// Gain and loss run over the flattened point order and are NOT reset at
    /// segment boundaries: the jump from the last point of one segment to the
    /// first of the next counts as climb or descent.
    pub fn elevation_stats(&self) -> Option<ElevationStats> {
        let elevations: Vec<f64> = self.points().filter_map(Point::elevation).collect();
        let (&first, rest) = elevations.split_first()?;

        let mut stats = ElevationStats {
            min: first,
            max: first,
            gain: 0.0,
            loss: 0.0,
        };
        let mut prev = first;
        for &ele in rest {
            stats.min = stats.min.min(ele);
            stats.max = stats.max.max(ele);
            let diff = ele - prev;
            if diff > 0.0 {
                stats.gain += diff;
            } else {
                stats.loss -= diff;
            }
            prev = ele;
        }
        Some(stats)
    }

    pub fn total_points(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }
}
