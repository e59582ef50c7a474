//! Streaming GPX reader.
//!
//! Walks the document once and copies out what the artwork needs. Elements
//! it does not know (extensions, links, GPX 1.0 speed/course) are skipped
//! whole. A point whose coordinates are missing or not numbers is dropped
//! with a warning; range checks happen later, in the model.

use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::error::GpxArtError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, GpxArtError>;
type XmlReader<'a> = Reader<&'a [u8]>;

/// A start tag plus whether it has a body to read (`false` for `<x/>`).
struct Element<'a> {
    start: BytesStart<'a>,
    open: bool,
}

/// Parse a GPX 1.0 or 1.1 document.
pub fn parse_gpx(xml: &str) -> Result<GpxData> {
    let mut reader = Reader::from_str(xml);
    let mut data = GpxData::default();

    loop {
        let el = match reader.read_event()? {
            Event::Start(start) => Element { start, open: true },
            Event::Empty(start) => Element { start, open: false },
            Event::Eof => break,
            _ => continue,
        };

        match el.start.local_name().as_ref() {
            b"gpx" => {}
            b"wpt" => data.waypoints.extend(read_point(&mut reader, &el)?),
            b"rte" if el.open => data.routes.push(read_route(&mut reader, &el)?),
            b"trk" if el.open => data.tracks.push(read_track(&mut reader, &el)?),
            b"metadata" => read_metadata(&mut reader, &el, &mut data.metadata)?,
            // GPX 1.0 keeps the document fields directly under <gpx>.
            tag => match data.metadata.text_field(tag) {
                Some(slot) => *slot = read_text(&mut reader, &el)?,
                None => skip(&mut reader, &el)?,
            },
        }
    }

    tracing::debug!(
        waypoints = data.waypoints.len(),
        routes = data.routes.len(),
        tracks = data.tracks.len(),
        "parsed GPX document"
    );
    Ok(data)
}

fn read_metadata(reader: &mut XmlReader<'_>, parent: &Element<'_>, meta: &mut GpxMetadata) -> Result<()> {
    while let Some(el) = next_child(reader, parent)? {
        let tag = el.start.local_name();
        if tag.as_ref() == b"author" {
            meta.author = read_author(reader, &el)?;
        } else if let Some(slot) = meta.text_field(tag.as_ref()) {
            *slot = read_text(reader, &el)?;
        } else {
            skip(reader, &el)?;
        }
    }
    Ok(())
}

/// GPX 1.1 authors are person records; only the name survives.
fn read_author(reader: &mut XmlReader<'_>, parent: &Element<'_>) -> Result<Option<String>> {
    let mut name = None;
    while let Some(el) = next_child(reader, parent)? {
        if el.start.local_name().as_ref() == b"name" {
            name = read_text(reader, &el)?;
        } else {
            skip(reader, &el)?;
        }
    }
    Ok(name)
}

fn read_route(reader: &mut XmlReader<'_>, parent: &Element<'_>) -> Result<GpxRoute> {
    let mut route = GpxRoute::default();
    while let Some(el) = next_child(reader, parent)? {
        match el.start.local_name().as_ref() {
            b"name" => route.name = read_text(reader, &el)?,
            b"rtept" => route.points.extend(read_point(reader, &el)?),
            _ => skip(reader, &el)?,
        }
    }
    Ok(route)
}

/// Segments that end up with no usable points are left out.
fn read_track(reader: &mut XmlReader<'_>, parent: &Element<'_>) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();
    while let Some(el) = next_child(reader, parent)? {
        match el.start.local_name().as_ref() {
            b"name" => track.name = read_text(reader, &el)?,
            b"trkseg" => {
                let mut points = Vec::new();
                while let Some(pt) = next_child(reader, &el)? {
                    if pt.start.local_name().as_ref() == b"trkpt" {
                        points.extend(read_point(reader, &pt)?);
                    } else {
                        skip(reader, &pt)?;
                    }
                }
                if !points.is_empty() {
                    track.segments.push(GpxSegment { points });
                }
            }
            _ => skip(reader, &el)?,
        }
    }
    Ok(track)
}

/// Read a wpt, rtept or trkpt. `None` when its coordinates are unusable.
fn read_point(reader: &mut XmlReader<'_>, el: &Element<'_>) -> Result<Option<GpxPoint>> {
    let mut point = match coordinates(&el.start) {
        Ok((lat, lon)) => GpxPoint::new(lat, lon),
        Err(err) => {
            tracing::warn!(%err, "skipping point without usable coordinates");
            skip(reader, el)?;
            return Ok(None);
        }
    };

    while let Some(child) = next_child(reader, el)? {
        match child.start.local_name().as_ref() {
            b"ele" => point.ele = read_text(reader, &child)?.and_then(|t| parse_elevation(&t)),
            b"time" => point.time = read_text(reader, &child)?,
            _ => skip(reader, &child)?,
        }
    }
    Ok(Some(point))
}

/// Elevation in meters. Text that is not a finite number (`NaN`, `inf`,
/// junk) leaves the point without elevation.
fn parse_elevation(text: &str) -> Option<f64> {
    match text.parse::<f64>() {
        Ok(ele) if ele.is_finite() => Some(ele),
        _ => {
            tracing::warn!(value = text, "ignoring unusable elevation");
            None
        }
    }
}

fn coordinates(start: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in start.attributes() {
        let attr = attr.map_err(|e| GpxArtError::XmlParse(e.into()))?;
        let (slot, attribute) = match attr.key.local_name().as_ref() {
            b"lat" => (&mut lat, "lat"),
            b"lon" => (&mut lon, "lon"),
            _ => continue,
        };
        let raw = String::from_utf8_lossy(&attr.value);
        let value = raw.trim().parse::<f64>().map_err(|_| GpxArtError::InvalidAttribute {
            element: "point",
            attribute,
            value: raw.to_string(),
        })?;
        *slot = Some(value);
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        (None, _) => Err(GpxArtError::MissingAttribute { element: "point", attribute: "lat" }),
        (_, None) => Err(GpxArtError::MissingAttribute { element: "point", attribute: "lon" }),
    }
}

/// Next child of `parent`, or `None` once its end tag is consumed.
fn next_child<'a>(reader: &mut XmlReader<'a>, parent: &Element<'_>) -> Result<Option<Element<'a>>> {
    if !parent.open {
        return Ok(None);
    }
    loop {
        match reader.read_event()? {
            Event::Start(start) => return Ok(Some(Element { start, open: true })),
            Event::Empty(start) => return Ok(Some(Element { start, open: false })),
            Event::End(end) if end.name() == parent.start.name() => return Ok(None),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn skip(reader: &mut XmlReader<'_>, el: &Element<'_>) -> Result<()> {
    if el.open {
        reader.read_to_end(el.start.name())?;
    }
    Ok(())
}

/// Trimmed text body of `el` with CDATA and entity references folded in.
/// `None` for a self-closing tag.
fn read_text(reader: &mut XmlReader<'_>, el: &Element<'_>) -> Result<Option<String>> {
    if !el.open {
        return Ok(None);
    }

    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&String::from_utf8_lossy(t.as_ref())),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(c.as_ref())),
            Event::GeneralRef(r) => push_entity(&mut text, &r),
            Event::End(end) if end.name() == el.start.name() => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(Some(text.trim().to_owned()))
}

fn push_entity(text: &mut String, entity: &BytesRef<'_>) {
    if let Ok(Some(ch)) = entity.resolve_char_ref() {
        text.push(ch);
        return;
    }
    let named = match &*String::from_utf8_lossy(entity.as_ref()) {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => return,
    };
    text.push(named);
}
