use crate::ir::DocumentStructureResponse;
use crate::layout::{Diagram, EdgeStyle};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Node/edge payload in the shape the browser diagram surface consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDump {
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    pub enhanced: bool,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: NodeData,
    pub position: PositionDump,
    pub source_position: String,
    pub target_position: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    pub level: u32,
    pub display_level: u32,
    pub page_reference: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PositionDump {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub connector: String,
    pub style: EdgeStyle,
    pub animated: bool,
}

impl DiagramDump {
    pub fn from_diagram(
        diagram: &Diagram,
        document_id: &str,
        response: Option<&DocumentStructureResponse>,
    ) -> Self {
        let nodes = diagram
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: node.kind.as_str().to_string(),
                data: NodeData {
                    label: node.label.clone(),
                    level: node.level,
                    display_level: node.display_level(),
                    page_reference: node.page_reference,
                    context: node.context.clone(),
                },
                position: PositionDump {
                    x: node.position.x,
                    y: node.position.y,
                },
                source_position: node.source_position().as_str().to_string(),
                target_position: node.target_position().as_str().to_string(),
            })
            .collect();

        let edges = diagram
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                connector: edge.connector.clone(),
                style: edge.style,
                animated: false,
            })
            .collect();

        DiagramDump {
            document_id: document_id.to_string(),
            document_name: response.and_then(|r| r.display_name()).map(str::to_string),
            enhanced: response.and_then(|r| r.enhanced).unwrap_or(false),
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_layout_dump(path: &Path, dump: &DiagramDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
