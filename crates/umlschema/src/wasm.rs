//! WebAssembly bindings
//!
//! Browser-facing wrappers that take diagram text and hand back JSON strings
//! for a presentation layer to render.

use wasm_bindgen::prelude::*;

use crate::plugins::plantuml::{snap_all, ClusterLayout, LayoutConfig};
use crate::plugins::schema::{generate_schemas, SchemaHeuristics};

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse diagram text and return the model as JSON
#[wasm_bindgen]
pub fn parse_model(input: &str) -> Result<String, JsValue> {
    let model = crate::parse(input);
    serde_json::to_string(&model).map_err(to_js_error)
}

/// Parse diagram text and return `{positions, canvas}` as JSON
///
/// With `snap` set, positions are quantized to the default snap size.
#[wasm_bindgen]
pub fn layout_model(input: &str, snap: bool) -> Result<String, JsValue> {
    let model = crate::parse(input);
    let config = LayoutConfig::default();
    let mut positions =
        ClusterLayout::with_config(config).compute(&model.diagram_nodes(), &model.relations);
    if snap {
        snap_all(&mut positions, config.snap_size);
    }
    let canvas = crate::plugins::plantuml::canvas_size(&positions, &config);
    serde_json::to_string(&serde_json::json!({
        "positions": positions,
        "canvas": canvas,
    }))
    .map_err(to_js_error)
}

/// Generate schemas as JSON: one object when `class_name` is given, else an array
#[wasm_bindgen]
pub fn generate_schema_json(input: &str, class_name: Option<String>) -> Result<String, JsValue> {
    let model = crate::parse(input);
    let output = generate_schemas(&model, class_name.as_deref(), SchemaHeuristics::default())
        .map_err(to_js_error)?;
    serde_json::to_string_pretty(&output).map_err(to_js_error)
}
