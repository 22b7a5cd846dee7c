use super::{Diagram, DiagramNode, NodeKind, Position};

pub const EMPTY_NODE_ID: &str = "empty";
pub const PLACEHOLDER_NODE_ID: &str = "placeholder";

/// Single-node diagram for a document whose structure came back empty.
pub fn empty_diagram(document_id: &str) -> Diagram {
    let label = if document_id.trim().is_empty() {
        "No document structure available".to_string()
    } else {
        format!("No document structure available for {document_id}")
    };
    single_node(EMPTY_NODE_ID, NodeKind::Empty, label)
}

/// Single-node diagram substituted when the structure could not be obtained
/// or processed at all.
pub fn placeholder_diagram(document_id: &str, reason: &str) -> Diagram {
    let subject = if document_id.trim().is_empty() {
        "document".to_string()
    } else {
        document_id.to_string()
    };
    let mut diagram = single_node(
        PLACEHOLDER_NODE_ID,
        NodeKind::Placeholder,
        format!("Unable to build a diagram for {subject}"),
    );
    let reason = reason.trim();
    if !reason.is_empty() {
        diagram.nodes[0].context = Some(reason.to_string());
    }
    diagram
}

fn single_node(id: &str, kind: NodeKind, label: String) -> Diagram {
    Diagram {
        nodes: vec![DiagramNode::new(
            id.to_string(),
            kind,
            label,
            0,
            Position::default(),
        )],
        edges: Vec::new(),
    }
}
