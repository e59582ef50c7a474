//! Writing artwork to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::converter::route_to_feature_collection;
use crate::draw;
use crate::error::GpxArtError;
use crate::model::Route;
use crate::options::{ArtOptions, ExportFormat};
use crate::render::RenderPlan;

type Result<T> = std::result::Result<T, GpxArtError>;

/// Output format from the path's extension.
pub fn detect_format(path: &Path) -> Result<ExportFormat> {
    let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
        GpxArtError::UnknownValue {
            kind: "output format",
            value: path.display().to_string(),
            expected: "a path ending in .png, .svg or .geojson",
        }
    })?;
    ExportFormat::from_extension(ext)
}

/// Render `route` in `format` and write it to `path`.
pub fn export(route: &Route, opts: &ArtOptions, path: &Path, format: ExportFormat) -> Result<()> {
    ensure_parent_dir(path)?;

    match format {
        ExportFormat::Svg => {
            let plan = RenderPlan::build(route, opts)?;
            fs::write(path, draw::render_svg(&plan, opts)?)?;
        }
        ExportFormat::Png => write_png(route, opts, path)?,
        ExportFormat::GeoJson => {
            let fc = route_to_feature_collection(route);
            fs::write(path, serde_json::to_string_pretty(&fc)?)?;
        }
    }

    ensure_written(path)?;
    tracing::info!(path = %path.display(), format = format.extension(), "exported");
    Ok(())
}

/// Write `base_path` with each format's extension. Returns the paths
/// written, in `formats` order.
pub fn export_multiple(
    route: &Route,
    opts: &ArtOptions,
    base_path: &Path,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = base_path.with_extension(format.extension());
        export(route, opts, &path, format)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(not(target_arch = "wasm32"))]
fn write_png(route: &Route, opts: &ArtOptions, path: &Path) -> Result<()> {
    let plan = RenderPlan::build(route, opts)?;
    draw::render_png(&plan, opts, path)
}

#[cfg(target_arch = "wasm32")]
fn write_png(_route: &Route, _opts: &ArtOptions, path: &Path) -> Result<()> {
    Err(GpxArtError::Export {
        path: path.to_path_buf(),
        reason: "PNG output is not available on this target".to_string(),
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => Err(GpxArtError::Export {
            path: path.to_path_buf(),
            reason: format!("output directory {} does not exist", dir.display()),
        }),
        _ => Ok(()),
    }
}

fn ensure_written(path: &Path) -> Result<()> {
    let len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if len == 0 {
        return Err(GpxArtError::Export {
            path: path.to_path_buf(),
            reason: "output file is empty or missing".to_string(),
        });
    }
    Ok(())
}
