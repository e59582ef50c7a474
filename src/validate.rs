//! Sanity checks on a parsed route. Issues are advisory: a route with issues
//! can still be rendered.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::Route;

/// Segments above this size are flagged as slow to draw.
pub const MAX_SEGMENT_POINTS: usize = 10_000;

/// Latitudes beyond this distort badly under Web Mercator.
pub const EXTREME_LATITUDE: f64 = 85.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub segments: Vec<String>,
    pub coordinates: Vec<String>,
    pub timestamps: Vec<String>,
}

impl ValidationReport {
    pub fn for_route(route: &Route) -> Self {
        Self {
            segments: validate_segments(route),
            coordinates: validate_coordinates(route),
            timestamps: validate_timestamps(route),
        }
    }

    pub fn issue_count(&self) -> usize {
        self.segments.len() + self.coordinates.len() + self.timestamps.len()
    }

    pub fn is_valid(&self) -> bool {
        self.issue_count() == 0
    }

    /// Non-empty groups with their heading, in display order.
    pub fn groups(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("Segment Issues", self.segments.as_slice()),
            ("Coordinate Issues", self.coordinates.as_slice()),
            ("Timestamp Issues", self.timestamps.as_slice()),
        ]
        .into_iter()
        .filter(|(_, issues)| !issues.is_empty())
    }
}

pub fn validate_segments(route: &Route) -> Vec<String> {
    if route.segments().is_empty() {
        return vec!["Route has no segments".to_string()];
    }

    let mut issues = Vec::new();
    for (i, segment) in route.segments().iter().enumerate() {
        let n = i + 1;
        match segment.len() {
            0 => issues.push(format!("Segment {n} has no points")),
            1 => issues.push(format!("Segment {n} has only one point - no route data")),
            len if len > MAX_SEGMENT_POINTS => issues.push(format!(
                "Segment {n} has {len} points, which may cause performance issues"
            )),
            _ => {}
        }
    }
    issues
}

pub fn validate_coordinates(route: &Route) -> Vec<String> {
    let mut issues = Vec::new();
    for (i, segment) in route.segments().iter().enumerate() {
        for (j, point) in segment.points().iter().enumerate() {
            if point.latitude().abs() > EXTREME_LATITUDE {
                issues.push(format!(
                    "Point {} in segment {} has extreme latitude ({}) which may cause issues with map projections",
                    j + 1,
                    i + 1,
                    point.latitude()
                ));
            }
        }
    }
    issues
}

/// Segments without any timestamps are skipped.
pub fn validate_timestamps(route: &Route) -> Vec<String> {
    let mut issues = Vec::new();
    for (i, segment) in route.segments().iter().enumerate() {
        let n = i + 1;
        let stamps: Vec<_> = segment.points().iter().map(|p| p.timestamp()).collect();
        let present: Vec<_> = stamps.iter().flatten().copied().collect();
        if present.is_empty() {
            continue;
        }

        if present.len() < stamps.len() {
            issues.push(format!(
                "Segment {n} has inconsistent timestamps (some points missing timestamp data)"
            ));
        }

        let out_of_order = stamps.windows(2).any(|w| match (w[0], w[1]) {
            (Some(prev), Some(curr)) => curr < prev,
            _ => false,
        });
        if out_of_order {
            issues.push(format!("Segment {n} has out-of-order timestamps"));
        }

        let unique: HashSet<_> = present.iter().collect();
        if unique.len() < present.len() {
            issues.push(format!("Segment {n} has duplicate timestamps"));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ingest::route_from_gpx;
    use crate::model::{Point, Segment};

    #[test]
    fn test_clean_route_is_valid() {
        let route = route_from_gpx(
            r#"<gpx><trk><trkseg>
  <trkpt lat="1" lon="1"><time>2025-01-01T00:00:00Z</time></trkpt>
  <trkpt lat="1.1" lon="1"><time>2025-01-01T00:01:00Z</time></trkpt>
</trkseg></trk></gpx>"#,
        )
        .unwrap();
        let report = ValidationReport::for_route(&route);
        assert!(report.is_valid());
        assert_eq!(report.groups().count(), 0);
    }

    #[test]
    fn test_segment_issues() {
        assert_eq!(
            validate_segments(&Route::default()),
            vec!["Route has no segments".to_string()]
        );

        let pt = || Point::new(1.0, 1.0).unwrap();
        let route = Route::new(
            vec![
                Segment::new(vec![], None),
                Segment::new(vec![pt()], None),
                Segment::new(vec![pt(); MAX_SEGMENT_POINTS + 1], None),
                Segment::new(vec![pt(), pt()], None),
            ],
            None,
            BTreeMap::new(),
        );
        assert_eq!(
            validate_segments(&route),
            vec![
                "Segment 1 has no points".to_string(),
                "Segment 2 has only one point - no route data".to_string(),
                "Segment 3 has 10001 points, which may cause performance issues".to_string(),
            ]
        );
    }

    #[test]
    fn test_extreme_latitude() {
        let route = route_from_gpx(
            r#"<gpx><trk><trkseg><trkpt lat="84.9" lon="0"/><trkpt lat="-86.5" lon="0"/></trkseg></trk></gpx>"#,
        )
        .unwrap();
        let issues = validate_coordinates(&route);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Point 2 in segment 1 has extreme latitude (-86.5)"));
    }

    #[test]
    fn test_timestamp_issues() {
        let route = route_from_gpx(
            r#"<gpx><trk>
<trkseg>
  <trkpt lat="1" lon="1"><time>2025-01-01T00:02:00Z</time></trkpt>
  <trkpt lat="1" lon="1"><time>2025-01-01T00:01:00Z</time></trkpt>
  <trkpt lat="1" lon="1"><time>2025-01-01T00:01:00Z</time></trkpt>
  <trkpt lat="1" lon="1"/>
</trkseg>
<trkseg><trkpt lat="1" lon="1"/><trkpt lat="2" lon="2"/></trkseg>
</trk></gpx>"#,
        )
        .unwrap();
        let report = ValidationReport::for_route(&route);
        assert_eq!(
            report.timestamps,
            vec![
                "Segment 1 has inconsistent timestamps (some points missing timestamp data)"
                    .to_string(),
                "Segment 1 has out-of-order timestamps".to_string(),
                "Segment 1 has duplicate timestamps".to_string(),
            ]
        );
        assert_eq!(report.issue_count(), 3);
        let groups: Vec<_> = report.groups().map(|(title, _)| title).collect();
        assert_eq!(groups, vec!["Timestamp Issues"]);
    }
}
