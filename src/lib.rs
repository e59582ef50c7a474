pub mod config;
pub mod converter;
pub mod draw;
pub mod error;
pub mod export;
pub mod geodesy;
pub mod gpx_types;
pub mod ingest;
pub mod markers;
pub mod model;
pub mod options;
pub mod parser;
pub mod pixel_text;
pub mod projection;
pub mod render;
pub mod summary;
pub mod validate;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use crate::error::GpxArtError;
pub use crate::ingest::route_from_gpx;
pub use crate::model::Route;
pub use crate::options::ArtOptions;
pub use crate::render::RenderPlan;

/// Render a GPX string as SVG artwork.
#[wasm_bindgen(js_name = gpxToSvg)]
pub fn gpx_to_svg(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let route = route_from_gpx(gpx_string)?;
    let plan = RenderPlan::build(&route, &opts)?;
    Ok(draw::render_svg(&plan, &opts)?)
}

/// Route metrics (distance, duration, bounds, elevation) as a JS object.
#[wasm_bindgen(js_name = gpxSummary)]
pub fn gpx_summary(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let route = route_from_gpx(gpx_string)?;
    to_js(&summary::RouteSummary::from_route(&route))
}

/// Convert a GPX string to GeoJSON, returned as a JS object.
#[wasm_bindgen(js_name = gpxToGeoJson)]
pub fn gpx_to_geojson(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let route = route_from_gpx(gpx_string)?;
    to_js(&converter::route_to_feature_collection(&route))
}

/// Convert a GPX string to GeoJSON, returned as a JSON string.
#[wasm_bindgen(js_name = gpxToGeoJsonString)]
pub fn gpx_to_geojson_string(gpx_string: &str) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let route = route_from_gpx(gpx_string)?;
    let fc = converter::route_to_feature_collection(&route);
    serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_options(options: JsValue) -> Result<ArtOptions, JsValue> {
    let opts: ArtOptions = if options.is_undefined() || options.is_null() {
        ArtOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    opts.validate()?;
    Ok(opts)
}

/// Plain JS objects rather than `Map`s for nested property maps.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
