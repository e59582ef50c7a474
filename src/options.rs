use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::GpxArtError;
use crate::markers::{DistanceUnit, MarkerSpacing};

type Result<T> = std::result::Result<T, GpxArtError>;

/// Everything that controls how a route is drawn and exported.
///
/// Built once (defaults, then config file, then CLI flags) and passed by
/// reference into rendering. Every key is optional in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtOptions {
    pub thickness: Thickness,
    pub color: String,
    pub style: LineStyle,
    pub markers: MarkerOptions,
    pub overlay: OverlayOptions,
    pub export: ExportOptions,
}

impl Default for ArtOptions {
    fn default() -> Self {
        Self {
            thickness: Thickness::Medium,
            color: "#000000".to_string(),
            style: LineStyle::Solid,
            markers: MarkerOptions::default(),
            overlay: OverlayOptions::default(),
            export: ExportOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerOptions {
    pub enabled: bool,
    pub unit: DistanceUnit,
    pub interval: f64,
    pub size: f64,
    /// Falls back to the route color.
    pub color: Option<String>,
    pub label_font_size: u32,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            unit: DistanceUnit::Miles,
            interval: 1.0,
            size: 6.0,
            color: None,
            label_font_size: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayOptions {
    pub enabled: bool,
    pub fields: Vec<OverlayField>,
    pub position: OverlayPosition,
    pub font_size: u32,
    pub font_color: String,
    pub background: bool,
    pub bg_color: String,
    pub bg_alpha: f64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            fields: vec![OverlayField::Distance, OverlayField::Date],
            position: OverlayPosition::TopLeft,
            font_size: 10,
            font_color: "black".to_string(),
            background: true,
            bg_color: "white".to_string(),
            bg_alpha: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    pub formats: Vec<ExportFormat>,
    /// Inches.
    pub width: f64,
    /// Inches.
    pub height: f64,
    pub dpi: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            formats: vec![ExportFormat::Png],
            width: 9.0,
            height: 6.0,
            dpi: 300,
        }
    }
}

impl ExportOptions {
    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width * dpi).round().max(1.0) as u32,
            (self.height * dpi).round().max(1.0) as u32,
        )
    }
}

impl ArtOptions {
    /// Range checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        parse_color(&self.color)?;
        if let Some(color) = &self.markers.color {
            parse_color(color)?;
        }
        parse_color(&self.overlay.font_color)?;
        parse_color(&self.overlay.bg_color)?;

        positive("markers.interval", self.markers.interval)?;
        positive("markers.size", self.markers.size)?;
        positive("export.width", self.export.width)?;
        positive("export.height", self.export.height)?;
        positive_int("export.dpi", self.export.dpi)?;
        positive_int("markers.label_font_size", self.markers.label_font_size)?;
        positive_int("overlay.font_size", self.overlay.font_size)?;

        if !(0.0..=1.0).contains(&self.overlay.bg_alpha) {
            return Err(GpxArtError::InvalidOption {
                name: "overlay.bg_alpha",
                reason: format!("must be between 0 and 1, got {}", self.overlay.bg_alpha),
            });
        }
        Ok(())
    }

    pub fn marker_spacing(&self) -> Result<MarkerSpacing> {
        MarkerSpacing::new(self.markers.unit, self.markers.interval)
    }

    pub fn marker_color(&self) -> &str {
        self.markers.color.as_deref().unwrap_or(&self.color)
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GpxArtError::InvalidOption {
            name,
            reason: format!("must be positive, got {value}"),
        })
    }
}

fn positive_int(name: &'static str, value: u32) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(GpxArtError::InvalidOption {
            name,
            reason: "must be positive, got 0".to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Thickness {
    Thin,
    #[default]
    Medium,
    Thick,
}

impl Thickness {
    /// Line width in points.
    pub fn line_width(self) -> f64 {
        match self {
            Self::Thin => 0.5,
            Self::Medium => 1.0,
            Self::Thick => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverlayField {
    Distance,
    Duration,
    Elevation,
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayPosition {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ExportFormat {
    #[serde(rename = "png")]
    #[value(name = "png")]
    Png,
    #[serde(rename = "svg")]
    #[value(name = "svg")]
    Svg,
    #[serde(rename = "geojson")]
    #[value(name = "geojson")]
    GeoJson,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::GeoJson => "geojson",
        }
    }

    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "geojson" | "json" => Ok(Self::GeoJson),
            _ => Err(GpxArtError::UnknownValue {
                kind: "output format",
                value: ext.to_string(),
                expected: "png, svg, geojson",
            }),
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or a basic named color into RGB.
pub fn parse_color(value: &str) -> Result<(u8, u8, u8)> {
    let v = value.trim().to_ascii_lowercase();
    if let Some(hex) = v.strip_prefix('#') {
        if !hex.is_ascii() {
            return Err(invalid_color(value));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(invalid_color(value)),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid_color(value))
        };
        return Ok((channel(0)?, channel(2)?, channel(4)?));
    }

    let rgb = match v.as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "gray" | "grey" => (128, 128, 128),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "brown" => (165, 42, 42),
        _ => return Err(invalid_color(value)),
    };
    Ok(rgb)
}

fn invalid_color(value: &str) -> GpxArtError {
    GpxArtError::UnknownValue {
        kind: "color",
        value: value.to_string(),
        expected: "#rgb, #rrggbb, or a basic color name",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let opts = ArtOptions::default();
        opts.validate().unwrap();
        assert_eq!(opts.marker_color(), "#000000");
        assert_eq!(opts.export.pixel_size(), (2700, 1800));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts: ArtOptions = serde_json::from_str(
            r#"{"thickness": "thick", "markers": {"unit": "km"}, "overlay": {"position": "bottom-right"}}"#,
        )
        .unwrap();
        assert_eq!(opts.thickness, Thickness::Thick);
        assert_eq!(opts.markers.unit, DistanceUnit::Kilometers);
        assert_eq!(opts.markers.interval, 1.0);
        assert_eq!(opts.overlay.position, OverlayPosition::BottomRight);
        assert_eq!(opts.overlay.fields, vec![OverlayField::Distance, OverlayField::Date]);
    }

    #[test]
    fn test_unknown_tokens_rejected_at_parse() {
        assert!(serde_json::from_str::<ArtOptions>(r#"{"thickness": "huge"}"#).is_err());
        assert!(serde_json::from_str::<ArtOptions>(r#"{"overlay": {"fields": ["speed"]}}"#).is_err());
        assert!(serde_json::from_str::<ArtOptions>(r#"{"colour": "red"}"#).is_err());
    }

    #[test]
    fn test_validate_ranges() {
        let mut opts = ArtOptions::default();
        opts.overlay.bg_alpha = 1.5;
        assert!(matches!(
            opts.validate(),
            Err(GpxArtError::InvalidOption { name: "overlay.bg_alpha", .. })
        ));

        let mut opts = ArtOptions::default();
        opts.markers.interval = 0.0;
        assert!(opts.validate().is_err());
        assert!(opts.marker_spacing().is_err());

        let mut opts = ArtOptions::default();
        opts.color = "chartreuse-ish".into();
        assert!(matches!(opts.validate(), Err(GpxArtError::UnknownValue { kind: "color", .. })));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF5500").unwrap(), (255, 85, 0));
        assert_eq!(parse_color("#f50").unwrap(), (255, 85, 0));
        assert_eq!(parse_color("Navy").unwrap(), (0, 0, 128));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_thickness_widths() {
        assert_eq!(Thickness::Thin.line_width(), 0.5);
        assert_eq!(Thickness::Medium.line_width(), 1.0);
        assert_eq!(Thickness::Thick.line_width(), 2.0);
    }

    #[test]
    fn test_export_format_from_extension() {
        assert_eq!(ExportFormat::from_extension("PNG").unwrap(), ExportFormat::Png);
        assert_eq!(ExportFormat::from_extension("json").unwrap(), ExportFormat::GeoJson);
        assert!(matches!(
            ExportFormat::from_extension("pdf"),
            Err(GpxArtError::UnknownValue { .. })
        ));
    }
}
