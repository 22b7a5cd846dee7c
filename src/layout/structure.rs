use std::collections::HashMap;

use tracing::{trace, warn};

use crate::config::StructureConfig;
use crate::ir::{DocumentStructureResponse, Subheading};

use super::error::empty_diagram;
use super::{Diagram, DiagramEdge, DiagramNode, EdgeStyle, NodeKind, Position};

/// Level assigned to the direct subheadings of every top-level heading.
const FIRST_SUBHEADING_LEVEL: u32 = 2;

/// Nodes and edges produced for one sibling list, plus the vertical extent
/// it consumed. Callers concatenate these; nothing is shared across calls.
#[derive(Debug, Default)]
struct SubtreeLayout {
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
    height: f32,
    last_y: f32,
}

#[derive(Debug, Clone, Copy)]
struct SiblingScope<'a> {
    section: usize,
    level: u32,
    parent_id: &'a str,
    parent_x: f32,
    path: &'a [usize],
}

pub fn heading_id(section: usize) -> String {
    format!("heading-{section}")
}

/// `path` holds the sibling index at every subheading level from 2 down, so
/// nested nodes under different parents never share an id.
pub fn subheading_id(section: usize, level: u32, path: &[usize]) -> String {
    format!("subheading-{section}-{level}-{}", join_path(path))
}

pub fn visual_id(section: usize, level: u32, path: &[usize], visual: usize) -> String {
    format!("visual-{section}-{level}-{}-{visual}", join_path(path))
}

fn join_path(path: &[usize]) -> String {
    path.iter()
        .map(|idx| idx.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// Horizontal offsets shrink geometrically below the first subheading level.
fn depth_factor(level: u32, config: &StructureConfig) -> f32 {
    if level > FIRST_SUBHEADING_LEVEL {
        config
            .depth_shrink
            .powi((level - FIRST_SUBHEADING_LEVEL) as i32)
    } else {
        1.0
    }
}

fn row_spacing(level: u32, config: &StructureConfig) -> f32 {
    config.row_height * (1.0 + level as f32 * config.depth_spacing_step).max(1.0)
}

fn sibling_side(index: usize) -> f32 {
    if index.is_multiple_of(2) { -1.0 } else { 1.0 }
}

/// Flattens the extracted heading tree into positioned nodes and edges.
///
/// Entries without a heading or title are skipped with a warning; their
/// siblings are laid out as if the entry were absent. The first kept
/// top-level heading is level 0 and every other one level 1, and
/// consecutive headings are chained with solid edges.
pub fn process_structure(
    response: &DocumentStructureResponse,
    document_id: &str,
    config: &StructureConfig,
) -> Diagram {
    if response.is_empty() {
        return empty_diagram(document_id);
    }

    let mut diagram = Diagram::default();
    let mut next_heading_y = 0.0f32;
    let mut previous_heading: Option<String> = None;
    let mut section = 0usize;

    for (raw_idx, entry) in response.sections().iter().enumerate() {
        let Some(label) = entry.label() else {
            warn!(
                document = document_id,
                index = raw_idx,
                "skipping top-level entry without a heading"
            );
            continue;
        };
        let id = heading_id(section);
        let level = if section == 0 { 0 } else { 1 };
        let heading_y = next_heading_y;
        diagram.nodes.push(
            DiagramNode::new(
                id.clone(),
                NodeKind::Heading,
                label,
                level,
                Position::new(0.0, heading_y),
            )
            .with_page(entry.page()),
        );
        if let Some(previous) = previous_heading.as_deref() {
            diagram
                .edges
                .push(DiagramEdge::new(previous, &id, EdgeStyle::Solid));
        }

        let mut consumed = config.row_height;
        if !entry.subheadings.is_empty() {
            let scope = SiblingScope {
                section,
                level: FIRST_SUBHEADING_LEVEL,
                parent_id: &id,
                parent_x: 0.0,
                path: &[],
            };
            let subtree = layout_subheadings(
                &entry.subheadings,
                scope,
                heading_y + config.row_height,
                config,
                document_id,
            );
            if !subtree.nodes.is_empty() {
                let used = config.row_height + subtree.height + config.row_height;
                consumed = consumed.max(used);
            }
            diagram.nodes.extend(subtree.nodes);
            diagram.edges.extend(subtree.edges);
        }

        next_heading_y = heading_y + consumed;
        previous_heading = Some(id);
        section += 1;
    }

    if diagram.nodes.is_empty() {
        warn!(
            document = document_id,
            "every top-level entry was malformed; using the empty diagram"
        );
        return empty_diagram(document_id);
    }

    trace_duplicate_labels(&diagram.nodes);
    diagram
}

fn layout_subheadings(
    subheadings: &[Subheading],
    scope: SiblingScope<'_>,
    start_y: f32,
    config: &StructureConfig,
    document_id: &str,
) -> SubtreeLayout {
    let mut out = SubtreeLayout {
        last_y: start_y,
        ..Default::default()
    };
    let offset = config.horizontal_spacing * depth_factor(scope.level, config);
    let visual_offset = config.horizontal_spacing / config.visual_offset_divisor.max(1.0);
    let spacing = row_spacing(scope.level, config);
    let mut cursor = start_y;
    let mut index = 0usize;

    for (raw_idx, sub) in subheadings.iter().enumerate() {
        let Some(label) = sub.label() else {
            warn!(
                document = document_id,
                parent = scope.parent_id,
                index = raw_idx,
                "skipping subheading without a title"
            );
            continue;
        };

        let mut path = scope.path.to_vec();
        path.push(index);
        let id = subheading_id(scope.section, scope.level, &path);
        let x = scope.parent_x + sibling_side(index) * offset;
        let y = cursor;
        let page = sub.page();

        let mut node = DiagramNode::new(
            id.clone(),
            NodeKind::Subheading,
            label,
            scope.level,
            Position::new(x, y),
        )
        .with_page(page);
        node.context = sub.context_text();
        out.nodes.push(node);
        out.edges
            .push(DiagramEdge::new(scope.parent_id, &id, EdgeStyle::Solid));

        let mut bottom = y;
        for (visual_idx, visual) in sub.visual_references.iter().enumerate() {
            let vid = visual_id(scope.section, scope.level, &path, visual_idx);
            let vx = x + sibling_side(visual_idx) * visual_offset;
            let vy = y + config.visual_spacing * (visual_idx as f32 + 1.0);
            out.nodes.push(
                DiagramNode::new(
                    vid.clone(),
                    NodeKind::Visual,
                    visual.caption(),
                    scope.level,
                    Position::new(vx, vy),
                )
                .with_page(visual.page(page)),
            );
            out.edges.push(DiagramEdge::new(&id, &vid, EdgeStyle::Dashed));
            bottom = vy;
        }

        if !sub.subheadings.is_empty() {
            let child_scope = SiblingScope {
                section: scope.section,
                level: scope.level + 1,
                parent_id: &id,
                parent_x: x,
                path: &path,
            };
            let child = layout_subheadings(
                &sub.subheadings,
                child_scope,
                bottom + spacing,
                config,
                document_id,
            );
            if !child.nodes.is_empty() {
                bottom = bottom.max(child.last_y);
            }
            out.nodes.extend(child.nodes);
            out.edges.extend(child.edges);
        }

        out.last_y = out.last_y.max(bottom);
        cursor = bottom + spacing;
        index += 1;
    }

    out.height = out.last_y - start_y;
    out
}

/// Debug-only view of label reuse. Ids are positional, so duplicates are harmless.
fn trace_duplicate_labels(nodes: &[DiagramNode]) {
    let mut by_label: HashMap<&str, &str> = HashMap::new();
    for node in nodes {
        if let Some(first) = by_label.get(node.label.as_str()) {
            trace!(label = %node.label, first = *first, duplicate = %node.id, "duplicate label");
        } else {
            by_label.insert(node.label.as_str(), node.id.as_str());
        }
    }
}
