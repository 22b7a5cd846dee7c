mod error;
mod optimize;
mod structure;
pub(crate) mod text;
pub(crate) mod types;
pub use error::{EMPTY_NODE_ID, PLACEHOLDER_NODE_ID, empty_diagram, placeholder_diagram};
pub use optimize::{OptimizeReport, count_overlaps, optimize_layout};
pub use structure::{heading_id, process_structure, subheading_id, visual_id};
pub use text::{measure_label, node_box};
pub use types::*;

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::ir::{DocumentStructureResponse, StructureError, parse_structure};

/// Builds the diagram for one structure response: tree walk first, then the
/// bounded overlap passes. Fallback diagrams skip the optimizer.
pub fn compute_layout(
    response: &DocumentStructureResponse,
    document_id: &str,
    config: &LayoutConfig,
) -> Diagram {
    let mut diagram = process_structure(response, document_id, &config.structure);
    if diagram.is_fallback() {
        return diagram;
    }
    let report = optimize_layout(&mut diagram, config);
    debug!(
        document = document_id,
        nodes = diagram.nodes.len(),
        edges = diagram.edges.len(),
        passes = report.passes,
        node_adjustments = report.node_adjustments,
        edge_adjustments = report.edge_adjustments,
        converged = report.converged,
        "diagram layout complete"
    );
    diagram
}

/// Like [`compute_layout`], but starting from raw extractor JSON. Input that
/// does not decode yields the placeholder diagram instead of an error.
pub fn compute_layout_from_json(raw: &str, document_id: &str, config: &LayoutConfig) -> Diagram {
    layout_or_placeholder(parse_structure(raw).as_ref(), document_id, config)
}

/// Lays out an already-decoded response, or substitutes the placeholder when
/// decoding failed.
pub fn layout_or_placeholder(
    parsed: Result<&DocumentStructureResponse, &StructureError>,
    document_id: &str,
    config: &LayoutConfig,
) -> Diagram {
    match parsed {
        Ok(response) => compute_layout(response, document_id, config),
        Err(err) => {
            warn!(document = document_id, error = %err, "structure response could not be decoded");
            placeholder_diagram(document_id, &err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DocumentStructure, Subheading, VisualReference};
    use std::collections::HashSet;

    fn sample() -> DocumentStructureResponse {
        let mut intro = DocumentStructure::new("Intro");
        let mut basics = Subheading::new("Basics");
        basics.visual_references.push(VisualReference::new("Diagram"));
        let mut detail = Subheading::new("Detail");
        detail.subheadings.push(Subheading::new("Deeper"));
        intro.subheadings = vec![basics, detail, Subheading::new("Basics")];
        DocumentStructureResponse::new(vec![intro, DocumentStructure::new("Outro")])
    }

    #[test]
    fn layout_preserves_identity_and_edges() {
        let config = LayoutConfig::default();
        let response = sample();
        let raw = process_structure(&response, "doc", &config.structure);
        let optimized = compute_layout(&response, "doc", &config);
        assert_eq!(raw.edges, optimized.edges);
        assert_eq!(raw.nodes.len(), optimized.nodes.len());
        for (before, after) in raw.nodes.iter().zip(&optimized.nodes) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.kind, after.kind);
            assert_eq!(before.label, after.label);
            assert_eq!(before.level, after.level);
            assert_eq!(before.page_reference, after.page_reference);
        }
    }

    #[test]
    fn every_non_root_node_has_one_parent() {
        let diagram = compute_layout(&sample(), "doc", &LayoutConfig::default());
        assert_eq!(diagram.edges.len(), diagram.nodes.len() - 1);
        let mut targets = HashSet::new();
        for edge in &diagram.edges {
            assert!(targets.insert(edge.target.as_str()), "{} has two parents", edge.target);
        }
        assert!(!targets.contains("heading-0"));
    }

    #[test]
    fn duplicate_titles_do_not_collide() {
        let diagram = compute_layout(&sample(), "doc", &LayoutConfig::default());
        let ids: HashSet<&str> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), diagram.nodes.len());
    }

    #[test]
    fn undecodable_json_becomes_placeholder() {
        let diagram = compute_layout_from_json("{not json", "doc", &LayoutConfig::default());
        assert_eq!(diagram.nodes.len(), 1);
        assert_eq!(diagram.nodes[0].id, PLACEHOLDER_NODE_ID);
        assert!(diagram.edges.is_empty());
    }

    #[test]
    fn decode_error_reason_reaches_placeholder() {
        let err = parse_structure("[1, 2").expect_err("truncated json");
        let diagram = layout_or_placeholder(Err(&err), "doc", &LayoutConfig::default());
        assert_eq!(diagram.nodes[0].id, PLACEHOLDER_NODE_ID);
        assert_eq!(diagram.nodes[0].context.as_deref(), Some(err.to_string().as_str()));
        assert_eq!(diagram, compute_layout_from_json("[1, 2", "doc", &LayoutConfig::default()));
    }

    #[test]
    fn fallback_is_not_moved() {
        let diagram = compute_layout(&DocumentStructureResponse::default(), "doc", &LayoutConfig::default());
        assert_eq!(diagram.nodes[0].id, EMPTY_NODE_ID);
        assert_eq!(diagram.nodes[0].position, Position::default());
    }
}
