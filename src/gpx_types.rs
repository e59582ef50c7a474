//! Raw GPX document as read from XML, before any validation.

/// Everything the reader pulls out of a GPX file.
#[derive(Debug, Default)]
pub struct GpxData {
    pub metadata: GpxMetadata,
    pub waypoints: Vec<GpxPoint>,
    pub routes: Vec<GpxRoute>,
    pub tracks: Vec<GpxTrack>,
}

/// Document-level metadata (`<metadata>` in GPX 1.1, top-level in 1.0).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GpxMetadata {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub author: Option<String>,
    pub time: Option<String>,
    pub keywords: Option<String>,
}

impl GpxMetadata {
    /// Slot for a plain-text metadata element, by tag name.
    pub fn text_field(&mut self, tag: &[u8]) -> Option<&mut Option<String>> {
        match tag {
            b"name" => Some(&mut self.name),
            b"desc" => Some(&mut self.desc),
            b"author" => Some(&mut self.author),
            b"time" => Some(&mut self.time),
            b"keywords" => Some(&mut self.keywords),
            _ => None,
        }
    }
}

/// A wpt, rtept or trkpt with raw coordinates. Time stays as text until
/// ingestion parses it.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub time: Option<String>,
}

impl GpxPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, ele: None, time: None }
    }
}

/// `<rte>`: a planned route, one flat point list.
#[derive(Debug, Default)]
pub struct GpxRoute {
    pub name: Option<String>,
    pub points: Vec<GpxPoint>,
}

/// `<trk>`: recorded track; only segments with points are kept.
#[derive(Debug, Default)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub segments: Vec<GpxSegment>,
}

#[derive(Debug, Default)]
pub struct GpxSegment {
    pub points: Vec<GpxPoint>,
}
