use docmap::{LayoutConfig, build_diagram_json};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagramOptions {
    optimize: Option<bool>,
    horizontal_spacing: Option<f32>,
    row_height: Option<f32>,
}

fn build_layout_config(options: DiagramOptions) -> LayoutConfig {
    let mut config = LayoutConfig::default();
    if let Some(optimize) = options.optimize {
        config.optimizer.enabled = optimize;
    }
    if let Some(spacing) = options.horizontal_spacing {
        config.structure.horizontal_spacing = spacing;
    }
    if let Some(row_height) = options.row_height {
        config.structure.row_height = row_height;
    }
    config
}

/// Lays out an extractor response for the dashboard's diagram view and
/// returns the node/edge JSON it renders.
#[wasm_bindgen]
pub fn build_diagram(
    structure_json: &str,
    document_id: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<DiagramOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        DiagramOptions::default()
    };

    let config = build_layout_config(options);
    build_diagram_json(structure_json, document_id, &config)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
