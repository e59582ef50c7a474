//! Draws a [`RenderPlan`] onto any plotters backend.

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};

use crate::error::GpxArtError;
use crate::options::{ArtOptions, LineStyle, OverlayPosition, parse_color};
#[cfg(not(target_arch = "wasm32"))]
use crate::pixel_text::PixelTextBackend;
use crate::render::RenderPlan;

type Result<T> = std::result::Result<T, GpxArtError>;

/// Dash and gap length, in multiples of the line width.
const DASH_ON: f64 = 3.7;
const DASH_OFF: f64 = 1.6;

/// Overlay inset from the canvas edge, as a fraction of each dimension.
const OVERLAY_INSET: f64 = 0.02;

fn render_error<E: std::fmt::Display>(err: E) -> GpxArtError {
    GpxArtError::Render(err.to_string())
}

fn rgb(color: &str) -> Result<RGBColor> {
    let (r, g, b) = parse_color(color)?;
    Ok(RGBColor(r, g, b))
}

/// Typographic points to whole pixels, never below one.
fn points_to_pixels(points: f64, scale: f64) -> u32 {
    (points * scale).round().max(1.0) as u32
}

/// Render to an in-memory SVG document.
pub fn render_svg(plan: &RenderPlan, opts: &ArtOptions) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, opts.export.pixel_size()).into_drawing_area();
        draw_plan(&root, plan, opts)?;
        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

/// Render straight to a PNG file. Labels and overlay text use the built-in
/// pixel font.
#[cfg(not(target_arch = "wasm32"))]
pub fn render_png(plan: &RenderPlan, opts: &ArtOptions, path: &Path) -> Result<()> {
    let backend = BitMapBackend::new(path, opts.export.pixel_size());
    let root = PixelTextBackend::new(backend).into_drawing_area();
    draw_plan(&root, plan, opts)?;
    root.present().map_err(render_error)?;
    Ok(())
}

/// White canvas, no axes, equal aspect. Segments first, then markers, then
/// the overlay box on top.
pub fn draw_plan<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &RenderPlan,
    opts: &ArtOptions,
) -> Result<()> {
    let (width, height) = root.dim_in_pixel();
    let scale = f64::from(opts.export.dpi) / 72.0;
    root.fill(&WHITE).map_err(render_error)?;

    let extents = plan.extents.fit_aspect(width, height);
    let mut chart = ChartBuilder::on(root)
        .build_cartesian_2d(extents.x_min..extents.x_max, extents.y_min..extents.y_max)
        .map_err(render_error)?;

    let stroke = points_to_pixels(opts.thickness.line_width(), scale);
    let line_style = rgb(&opts.color)?.stroke_width(stroke);

    for segment in &plan.segments {
        match opts.style {
            LineStyle::Solid => {
                chart
                    .draw_series(LineSeries::new(segment.points(), line_style))
                    .map_err(render_error)?;
            }
            LineStyle::Dashed => {
                let units_per_px = extents.width() / f64::from(width.max(1));
                let dash = f64::from(stroke) * units_per_px;
                let points: Vec<(f64, f64)> = segment.points().collect();
                chart
                    .draw_series(
                        dash_polyline(&points, DASH_ON * dash, DASH_OFF * dash)
                            .into_iter()
                            .map(|d| PathElement::new(d, line_style)),
                    )
                    .map_err(render_error)?;
            }
        }
    }

    if let Some(unit) = plan.marker_unit {
        let color = rgb(opts.marker_color())?;
        let radius = points_to_pixels(opts.markers.size / 2.0, scale);
        let offset = radius as i32 + points_to_pixels(3.0, scale) as i32;
        let font = FontDesc::new(
            FontFamily::SansSerif,
            f64::from(opts.markers.label_font_size) * scale,
            FontStyle::Normal,
        );
        chart
            .draw_series(plan.segments.iter().flat_map(|s| &s.markers).map(|m| {
                EmptyElement::at((m.x, m.y))
                    + Circle::new((0, 0), radius, color.filled())
                    + Text::new(m.label(unit), (offset, -offset), font.color(&color))
            }))
            .map_err(render_error)?;
    }

    if !plan.overlay.is_empty() {
        draw_overlay(root, &plan.overlay, opts, scale)?;
    }
    Ok(())
}

fn draw_overlay<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    lines: &[String],
    opts: &ArtOptions,
    scale: f64,
) -> Result<()> {
    let overlay = &opts.overlay;
    let font_px = f64::from(overlay.font_size) * scale;
    let line_height = (font_px * 1.3).ceil() as i32;
    let pad = (font_px * 0.5).ceil() as i32;

    // No font metrics without a font backend; estimate from glyph count.
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_size = (
        (widest as f64 * font_px * 0.6).ceil() as i32 + 2 * pad,
        line_height * lines.len() as i32 + 2 * pad,
    );

    let (w, h) = root.dim_in_pixel();
    let canvas = (w as i32, h as i32);
    let inset = (
        (f64::from(w) * OVERLAY_INSET).round() as i32,
        (f64::from(h) * OVERLAY_INSET).round() as i32,
    );
    let (x0, y0) = overlay_origin(overlay.position, canvas, box_size, inset);

    if overlay.background {
        let bg = rgb(&overlay.bg_color)?.mix(overlay.bg_alpha);
        root.draw(&Rectangle::new(
            [(x0, y0), (x0 + box_size.0, y0 + box_size.1)],
            bg.filled(),
        ))
        .map_err(render_error)?;
    }

    let style = FontDesc::new(FontFamily::SansSerif, font_px, FontStyle::Normal)
        .color(&rgb(&overlay.font_color)?);
    for (i, line) in lines.iter().enumerate() {
        let pos = (x0 + pad, y0 + pad + i as i32 * line_height);
        root.draw(&Text::new(line.as_str(), pos, style.clone()))
            .map_err(render_error)?;
    }
    Ok(())
}

/// Top-left pixel of a `size` box anchored in the given corner.
pub fn overlay_origin(
    position: OverlayPosition,
    canvas: (i32, i32),
    size: (i32, i32),
    inset: (i32, i32),
) -> (i32, i32) {
    let right = canvas.0 - size.0 - inset.0;
    let bottom = canvas.1 - size.1 - inset.1;
    match position {
        OverlayPosition::TopLeft => (inset.0, inset.1),
        OverlayPosition::TopRight => (right, inset.1),
        OverlayPosition::BottomLeft => (inset.0, bottom),
        OverlayPosition::BottomRight => (right, bottom),
    }
}

/// Split a polyline into dashes of length `on` separated by gaps of length
/// `off`, measured along the line. The pattern carries across vertices.
pub fn dash_polyline(points: &[(f64, f64)], on: f64, off: f64) -> Vec<Vec<(f64, f64)>> {
    if points.len() < 2 {
        return Vec::new();
    }
    if on <= 0.0 || off <= 0.0 {
        return vec![points.to_vec()];
    }

    let mut dashes = Vec::new();
    let mut current = vec![points[0]];
    let mut drawing = true;
    let mut left = on;

    for pair in points.windows(2) {
        let (mut x0, mut y0) = pair[0];
        let (x1, y1) = pair[1];
        let mut len = (x1 - x0).hypot(y1 - y0);

        while len > left {
            let t = left / len;
            let split = (x0 + t * (x1 - x0), y0 + t * (y1 - y0));
            if drawing {
                current.push(split);
                dashes.push(std::mem::take(&mut current));
            } else {
                current = vec![split];
            }
            drawing = !drawing;
            (x0, y0) = split;
            len = (x1 - x0).hypot(y1 - y0);
            left = if drawing { on } else { off };
        }

        left -= len;
        if drawing {
            current.push((x1, y1));
        }
    }

    if drawing && current.len() >= 2 {
        dashes.push(current);
    }
    dashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::route_from_gpx;
    use crate::markers::DistanceUnit;
    use crate::options::OverlayField;

    fn small_opts() -> ArtOptions {
        let mut opts = ArtOptions::default();
        opts.export.dpi = 72;
        opts.markers.unit = DistanceUnit::Kilometers;
        opts
    }

    fn ride() -> RenderPlan {
        let route = route_from_gpx(
            r#"<gpx><trk><name>Ride</name><trkseg>
  <trkpt lat="10.0" lon="20.0"><time>2025-06-01T10:00:00Z</time></trkpt>
  <trkpt lat="10.0" lon="20.05"><time>2025-06-01T10:30:00Z</time></trkpt>
  <trkpt lat="10.02" lon="20.1"><time>2025-06-01T11:00:00Z</time></trkpt>
</trkseg></trk></gpx>"#,
        )
        .unwrap();
        RenderPlan::build(&route, &small_opts()).unwrap()
    }

    #[test]
    fn test_dash_straight_line() {
        let dashes = dash_polyline(&[(0.0, 0.0), (10.0, 0.0)], 2.0, 1.0);
        assert_eq!(dashes.len(), 4);
        assert_eq!(dashes[0], vec![(0.0, 0.0), (2.0, 0.0)]);
        let last = dashes.last().unwrap();
        assert_eq!(*last.last().unwrap(), (10.0, 0.0));
        assert!((last[0].0 - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_dash_carries_across_vertices() {
        // 1.5 + 1.5 along an L: the first dash bends around the corner.
        let dashes = dash_polyline(&[(0.0, 0.0), (1.5, 0.0), (1.5, 1.5)], 2.0, 10.0);
        assert_eq!(dashes.len(), 1);
        assert_eq!(dashes[0].len(), 3);
        assert_eq!(dashes[0][1], (1.5, 0.0));
        assert!((dashes[0][2].1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_dash_degenerate_inputs() {
        assert!(dash_polyline(&[(1.0, 1.0)], 1.0, 1.0).is_empty());
        let solid = dash_polyline(&[(0.0, 0.0), (1.0, 1.0)], 0.0, 1.0);
        assert_eq!(solid, vec![vec![(0.0, 0.0), (1.0, 1.0)]]);
    }

    #[test]
    fn test_overlay_origin_corners() {
        let canvas = (1000, 500);
        let size = (200, 100);
        let inset = (20, 10);
        assert_eq!(overlay_origin(OverlayPosition::TopLeft, canvas, size, inset), (20, 10));
        assert_eq!(overlay_origin(OverlayPosition::TopRight, canvas, size, inset), (780, 10));
        assert_eq!(overlay_origin(OverlayPosition::BottomLeft, canvas, size, inset), (20, 390));
        assert_eq!(overlay_origin(OverlayPosition::BottomRight, canvas, size, inset), (780, 390));
    }

    #[test]
    fn test_svg_contains_route_markers_and_overlay() {
        let plan = ride();
        let svg = render_svg(&plan, &small_opts()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polyline"));
        assert_eq!(svg.matches("<circle").count(), plan.marker_count());
        assert!(svg.contains("1 km"));
        assert!(svg.contains("Distance:"));
        assert!(svg.contains("2025-06-01"));
    }

    #[test]
    fn test_svg_dashed_and_without_extras() {
        let mut opts = small_opts();
        opts.style = LineStyle::Dashed;
        opts.markers.enabled = false;
        opts.overlay.fields = vec![OverlayField::Name];
        let route = route_from_gpx(
            r#"<gpx><trk><trkseg><trkpt lat="0" lon="0"/><trkpt lat="0" lon="1"/></trkseg></trk></gpx>"#,
        )
        .unwrap();
        let plan = RenderPlan::build(&route, &opts).unwrap();
        assert!(plan.overlay.is_empty());

        let svg = render_svg(&plan, &opts).unwrap();
        assert!(svg.matches("<polyline").count() > 10);
        assert!(!svg.contains("<circle"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn test_png_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ride.png");
        render_png(&ride(), &small_opts(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_png_with_default_options_draws_text() {
        let opts = ArtOptions::default();
        let route = route_from_gpx(
            r#"<gpx><trk><name>Ride</name><trkseg>
  <trkpt lat="10.0" lon="20.0"><time>2025-06-01T10:00:00Z</time></trkpt>
  <trkpt lat="10.0" lon="20.05"><time>2025-06-01T10:30:00Z</time></trkpt>
</trkseg></trk></gpx>"#,
        )
        .unwrap();
        let plan = RenderPlan::build(&route, &opts).unwrap();
        assert!(plan.marker_count() > 0);
        assert!(!plan.overlay.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.png");
        render_png(&plan, &opts, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
