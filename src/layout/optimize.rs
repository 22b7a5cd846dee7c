use std::collections::HashMap;

use tracing::debug;

use crate::config::{LabelConfig, LayoutConfig};

use super::text::node_box;
use super::{Diagram, DiagramNode, NodeBox};

/// What the optimizer did. Residual overlap after the last pass is expected
/// in dense diagrams; `converged` only says whether a pass came back clean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub passes: usize,
    pub node_adjustments: usize,
    pub edge_adjustments: usize,
    pub converged: bool,
}

/// Nudges node positions apart for a bounded number of passes. Only
/// `position` is touched; ids, labels, levels, and edges are left alone.
pub fn optimize_layout(diagram: &mut Diagram, config: &LayoutConfig) -> OptimizeReport {
    let max_passes = config.optimizer.effective_passes();
    let mut report = OptimizeReport::default();
    if max_passes == 0 || diagram.nodes.is_empty() {
        return report;
    }

    // Box sizes depend on kind and label only, so they hold for every pass.
    let sizes = box_sizes(&diagram.nodes, &config.label);
    let endpoints = edge_endpoints(diagram);
    let margin = config.optimizer.margin;
    let push = config.optimizer.spacing_unit / 2.0;

    for pass in 0..max_passes {
        let node_moves = separate_nodes(&mut diagram.nodes, &sizes, margin);
        let edge_moves = clear_edges(&mut diagram.nodes, &sizes, &endpoints, push);
        report.passes += 1;
        report.node_adjustments += node_moves;
        report.edge_adjustments += edge_moves;
        debug!(pass, node_moves, edge_moves, "overlap pass");
        if node_moves == 0 && edge_moves == 0 {
            report.converged = true;
            break;
        }
    }

    report
}

/// Number of node pairs whose estimated boxes still intersect.
pub fn count_overlaps(diagram: &Diagram, config: &LabelConfig) -> usize {
    let sizes = box_sizes(&diagram.nodes, config);
    let mut count = 0usize;
    for i in 0..diagram.nodes.len() {
        for j in (i + 1)..diagram.nodes.len() {
            let a = boxed(&diagram.nodes[i], sizes[i]);
            let b = boxed(&diagram.nodes[j], sizes[j]);
            if a.intersects(&b) {
                count += 1;
            }
        }
    }
    count
}

fn box_sizes(nodes: &[DiagramNode], config: &LabelConfig) -> Vec<(f32, f32)> {
    nodes
        .iter()
        .map(|node| {
            let b = node_box(node, config);
            (b.width, b.height)
        })
        .collect()
}

fn edge_endpoints(diagram: &Diagram) -> Vec<(usize, usize)> {
    let index: HashMap<&str, usize> = diagram
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();
    diagram
        .edges
        .iter()
        .filter_map(|edge| {
            let source = index.get(edge.source.as_str())?;
            let target = index.get(edge.target.as_str())?;
            Some((*source, *target))
        })
        .collect()
}

fn boxed(node: &DiagramNode, size: (f32, f32)) -> NodeBox {
    NodeBox {
        cx: node.position.x,
        cy: node.position.y,
        width: size.0,
        height: size.1,
    }
}

/// Pairwise sweep. Each overlapping pair is split along the axis with the
/// smaller overlap, each node moving half of overlap plus margin.
fn separate_nodes(nodes: &mut [DiagramNode], sizes: &[(f32, f32)], margin: f32) -> usize {
    let mut moves = 0usize;
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let a = boxed(&nodes[i], sizes[i]);
            let b = boxed(&nodes[j], sizes[j]);
            let (overlap_x, overlap_y) = a.overlap(&b);
            if overlap_x <= 0.0 || overlap_y <= 0.0 {
                continue;
            }
            if overlap_x <= overlap_y {
                let shift = (overlap_x + margin) / 2.0;
                let sign = if a.cx <= b.cx { -1.0 } else { 1.0 };
                nodes[i].position.x += sign * shift;
                nodes[j].position.x -= sign * shift;
            } else {
                let shift = (overlap_y + margin) / 2.0;
                let sign = if a.cy <= b.cy { -1.0 } else { 1.0 };
                nodes[i].position.y += sign * shift;
                nodes[j].position.y -= sign * shift;
            }
            moves += 1;
        }
    }
    moves
}

/// Moves nodes off the bounding box of edges they are not part of,
/// perpendicular to the edge's dominant axis.
fn clear_edges(
    nodes: &mut [DiagramNode],
    sizes: &[(f32, f32)],
    endpoints: &[(usize, usize)],
    push: f32,
) -> usize {
    let mut moves = 0usize;
    for &(source, target) in endpoints {
        let from = nodes[source].position;
        let to = nodes[target].position;
        let min_x = from.x.min(to.x);
        let max_x = from.x.max(to.x);
        let min_y = from.y.min(to.y);
        let max_y = from.y.max(to.y);
        let span = NodeBox {
            cx: (min_x + max_x) / 2.0,
            cy: (min_y + max_y) / 2.0,
            width: max_x - min_x,
            height: max_y - min_y,
        };
        let horizontal = span.width > span.height;

        for k in 0..nodes.len() {
            if k == source || k == target {
                continue;
            }
            let candidate = boxed(&nodes[k], sizes[k]);
            if !span.intersects(&candidate) {
                continue;
            }
            let position = &mut nodes[k].position;
            if horizontal {
                position.y += if position.y < span.cy { -push } else { push };
            } else {
                position.x += if position.x < span.cx { -push } else { push };
            }
            moves += 1;
        }
    }
    moves
}
