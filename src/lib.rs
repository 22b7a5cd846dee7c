pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod state;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config, parse_config};
pub use ir::{
    DocumentStructure, DocumentStructureResponse, StructureError, Subheading, VisualReference,
    parse_structure, read_structure,
};
pub use layout::{
    Diagram, DiagramEdge, DiagramNode, EdgeStyle, NodeKind, OptimizeReport, Position,
    compute_layout, compute_layout_from_json, layout_or_placeholder, optimize_layout,
    process_structure,
};
pub use layout_dump::DiagramDump;
pub use render::render_svg;
pub use state::{DiagramState, StateError};
pub use theme::Theme;

/// Builds a diagram from raw extractor JSON and returns it in the rendering
/// contract's JSON form. Undecodable input yields the placeholder diagram.
pub fn build_diagram_json(raw: &str, document_id: &str, config: &LayoutConfig) -> anyhow::Result<String> {
    let response = parse_structure(raw);
    let diagram = layout::layout_or_placeholder(response.as_ref(), document_id, config);
    let dump = DiagramDump::from_diagram(&diagram, document_id, response.as_ref().ok());
    Ok(dump.to_json()?)
}
