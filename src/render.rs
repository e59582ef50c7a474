//! Rendering orchestration: turns a [`Route`] plus [`ArtOptions`] into
//! projected geometry ready for a plotting backend (see [`crate::draw`]).

use serde::Serialize;

use crate::error::GpxArtError;
use crate::ingest::parse_timestamp;
use crate::markers::{DistanceUnit, Marker, place_markers};
use crate::model::{Bounds, Route, Segment};
use crate::options::{ArtOptions, OverlayField};
use crate::projection::project_clamped;
use crate::summary::{format_distance, format_duration};

type Result<T> = std::result::Result<T, GpxArtError>;

/// Fraction of each axis' range added as margin on both sides.
pub const PADDING: f64 = 0.05;

/// Plot extents in projection units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extents {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extents {
    /// Project the two corners of `bounds` and pad each axis by 5%.
    pub fn from_bounds(bounds: &Bounds) -> Self {
        let (x_min, y_min) = project_clamped(bounds.min_lat, bounds.min_lon);
        let (x_max, y_max) = project_clamped(bounds.max_lat, bounds.max_lon);
        let pad_x = (x_max - x_min) * PADDING;
        let pad_y = (y_max - y_min) * PADDING;
        Self {
            x_min: x_min - pad_x,
            x_max: x_max + pad_x,
            y_min: y_min - pad_y,
            y_max: y_max + pad_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Grow the shorter axis (about the centre) so one projection unit is the
    /// same number of pixels on both axes of a `width`×`height` canvas.
    /// Zero-size extents (a single point) get a tiny square first.
    pub fn fit_aspect(&self, width: u32, height: u32) -> Self {
        const MIN_SPAN: f64 = 1e-6;
        let canvas = f64::from(width.max(1)) / f64::from(height.max(1));

        let mut dx = self.width().max(0.0);
        let mut dy = self.height().max(0.0);
        if dx <= 0.0 && dy <= 0.0 {
            dx = MIN_SPAN;
            dy = MIN_SPAN;
        }
        if dy <= 0.0 || dx / dy > canvas {
            dy = dx / canvas;
        } else {
            dx = dy * canvas;
        }

        let cx = (self.x_min + self.x_max) / 2.0;
        let cy = (self.y_min + self.y_max) / 2.0;
        Self {
            x_min: cx - dx / 2.0,
            x_max: cx + dx / 2.0,
            y_min: cy - dy / 2.0,
            y_max: cy + dy / 2.0,
        }
    }
}

/// One segment's polyline in projection units, plus its markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedSegment {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub markers: Vec<Marker>,
}

impl ProjectedSegment {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// Project every point of `segment`, in order.
pub fn project_segment(segment: &Segment) -> (Vec<f64>, Vec<f64>) {
    segment
        .points()
        .iter()
        .map(|p| project_clamped(p.latitude(), p.longitude()))
        .unzip()
}

/// Everything a backend needs to draw a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub segments: Vec<ProjectedSegment>,
    pub extents: Extents,
    /// Unit of the marker labels, when markers are drawn.
    pub marker_unit: Option<DistanceUnit>,
    pub overlay: Vec<String>,
}

impl RenderPlan {
    pub fn build(route: &Route, opts: &ArtOptions) -> Result<Self> {
        if route.total_points() == 0 {
            return Err(GpxArtError::EmptyRoute);
        }

        let spacing = if opts.markers.enabled {
            Some(opts.marker_spacing()?)
        } else {
            None
        };

        let segments = route
            .segments()
            .iter()
            .filter(|s| !s.is_empty())
            .map(|segment| {
                let (xs, ys) = project_segment(segment);
                let markers = spacing
                    .as_ref()
                    .map(|sp| place_markers(segment, sp))
                    .unwrap_or_default();
                ProjectedSegment { xs, ys, markers }
            })
            .collect();

        let extents = Extents::from_bounds(&route.bounds());
        let overlay = if opts.overlay.enabled {
            overlay_lines(route, &opts.overlay.fields)
        } else {
            Vec::new()
        };

        tracing::debug!(?extents, overlay_lines = overlay.len(), "built render plan");
        Ok(Self {
            segments,
            extents,
            marker_unit: spacing.map(|s| s.unit()),
            overlay,
        })
    }

    pub fn marker_count(&self) -> usize {
        self.segments.iter().map(|s| s.markers.len()).sum()
    }
}

/// Overlay text, one line per requested field. Fields without data are
/// left out.
pub fn overlay_lines(route: &Route, fields: &[OverlayField]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| match field {
            OverlayField::Distance => {
                Some(format!("Distance: {}", format_distance(route.total_distance())))
            }
            OverlayField::Duration => route
                .total_duration()
                .map(|d| format!("Duration: {}", format_duration(Some(d)))),
            OverlayField::Elevation => route.elevation_stats().map(|s| {
                format!("Elevation: +{:.0} m / -{:.0} m", s.gain, s.loss)
            }),
            OverlayField::Name => route
                .name()
                .or_else(|| route.metadata().get("name").map(String::as_str))
                .map(str::to_string),
            OverlayField::Date => route
                .start_time()
                .or_else(|| route.metadata().get("time").and_then(|t| parse_timestamp(t)))
                .map(|t| t.format("%Y-%m-%d").to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ingest::route_from_gpx;
    use crate::model::Point;
    use crate::projection::project;

    fn line_route() -> Route {
        route_from_gpx(
            r#"<gpx><trk><name>Line</name><trkseg>
  <trkpt lat="10.0" lon="20.0"><ele>5</ele><time>2025-06-01T10:00:00Z</time></trkpt>
  <trkpt lat="10.0" lon="20.05"><ele>15</ele><time>2025-06-01T10:30:00Z</time></trkpt>
  <trkpt lat="10.02" lon="20.1"><ele>10</ele><time>2025-06-01T11:00:00Z</time></trkpt>
</trkseg></trk></gpx>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extents_pad_five_percent() {
        let bounds = Bounds { min_lat: 0.0, max_lat: 10.0, min_lon: 0.0, max_lon: 20.0 };
        let e = Extents::from_bounds(&bounds);
        let (x1, y1) = project(10.0, 20.0);
        assert_eq!(e.x_min, -x1 * 0.05);
        assert!((e.x_max - x1 * 1.05).abs() < 1e-12);
        assert!((e.y_min + y1 * 0.05).abs() < 1e-12);
        assert!((e.y_max - y1 * 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_fit_aspect_keeps_content_and_ratio() {
        let e = Extents { x_min: 0.0, x_max: 1.0, y_min: 0.0, y_max: 1.0 };
        let wide = e.fit_aspect(200, 100);
        assert!((wide.width() - 2.0).abs() < 1e-12);
        assert!((wide.height() - 1.0).abs() < 1e-12);
        assert!(wide.x_min <= e.x_min && wide.x_max >= e.x_max);

        let single = Extents { x_min: 1.0, x_max: 1.0, y_min: 2.0, y_max: 2.0 }.fit_aspect(100, 100);
        assert!(single.width() > 0.0 && single.height() > 0.0);
        assert!(((single.x_min + single.x_max) / 2.0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_plan_projects_every_point() {
        let route = line_route();
        let plan = RenderPlan::build(&route, &ArtOptions::default()).unwrap();
        assert_eq!(plan.segments.len(), 1);
        let seg = &plan.segments[0];
        assert_eq!(seg.xs.len(), 3);
        assert_eq!(seg.points().next(), Some(project(10.0, 20.0)));
        assert_eq!(plan.extents, Extents::from_bounds(&route.bounds()));
    }

    #[test]
    fn test_plan_markers_follow_options() {
        let route = line_route();
        // ~11 km route
        let mut opts = ArtOptions::default();
        opts.markers.unit = DistanceUnit::Kilometers;
        opts.markers.interval = 5.0;
        let plan = RenderPlan::build(&route, &opts).unwrap();
        assert_eq!(plan.marker_count(), 2);
        assert_eq!(plan.marker_unit, Some(DistanceUnit::Kilometers));

        opts.markers.enabled = false;
        let plan = RenderPlan::build(&route, &opts).unwrap();
        assert_eq!(plan.marker_count(), 0);
        assert_eq!(plan.marker_unit, None);

        opts.markers.enabled = true;
        opts.markers.interval = -1.0;
        assert!(matches!(
            RenderPlan::build(&route, &opts),
            Err(GpxArtError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_empty_route_cannot_be_planned() {
        assert!(matches!(
            RenderPlan::build(&Route::default(), &ArtOptions::default()),
            Err(GpxArtError::EmptyRoute)
        ));
    }

    #[test]
    fn test_overlay_lines() {
        let route = line_route();
        let lines = overlay_lines(
            &route,
            &[
                OverlayField::Name,
                OverlayField::Date,
                OverlayField::Duration,
                OverlayField::Elevation,
            ],
        );
        assert_eq!(
            lines,
            vec![
                "Line".to_string(),
                "2025-06-01".to_string(),
                "Duration: 1 hour".to_string(),
                "Elevation: +10 m / -5 m".to_string(),
            ]
        );
    }

    #[test]
    fn test_overlay_skips_missing_data() {
        let route = Route::new(
            vec![Segment::new(vec![Point::new(1.0, 1.0).unwrap()], None)],
            None,
            BTreeMap::new(),
        );
        let lines = overlay_lines(
            &route,
            &[OverlayField::Duration, OverlayField::Elevation, OverlayField::Name, OverlayField::Date],
        );
        assert!(lines.is_empty());
        let lines = overlay_lines(&route, &[OverlayField::Distance]);
        assert_eq!(lines, vec!["Distance: 0.00 km (0.00 miles)".to_string()]);
    }
}
