use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{Diagram, DiagramNode, EdgeStyle, NodeBox, NodeKind, node_box};
use crate::text_metrics::fit_to_width;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

fn diagram_bounds(boxes: &[NodeBox]) -> Option<Bounds> {
    let first = boxes.first()?;
    let mut bounds = Bounds {
        min_x: first.left(),
        min_y: first.top(),
        max_x: first.right(),
        max_y: first.bottom(),
    };
    for b in boxes.iter().skip(1) {
        bounds.min_x = bounds.min_x.min(b.left());
        bounds.min_y = bounds.min_y.min(b.top());
        bounds.max_x = bounds.max_x.max(b.right());
        bounds.max_y = bounds.max_y.max(b.bottom());
    }
    Some(bounds)
}

// Node boxes use the optimizer's size estimate, so overlaps shown here are the
// overlaps it saw.
pub fn render_svg(diagram: &Diagram, theme: &Theme, config: &LayoutConfig, render: &RenderConfig) -> String {
    let boxes: Vec<NodeBox> = diagram
        .nodes
        .iter()
        .map(|node| node_box(node, &config.label))
        .collect();
    let pad = render.padding.max(0.0);
    let (offset_x, offset_y, width, height) = match diagram_bounds(&boxes) {
        Some(b) => (
            pad - b.min_x,
            pad - b.min_y,
            (b.max_x - b.min_x + pad * 2.0).max(200.0),
            (b.max_y - b.min_y + pad * 2.0).max(200.0),
        ),
        None => (pad, pad, render.width, render.height),
    };

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    let index: HashMap<&str, usize> = diagram
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    for edge in &diagram.edges {
        let (Some(&from), Some(&to)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) else {
            continue;
        };
        // Bottom handle of the source to the top handle of the target.
        let start = (boxes[from].cx + offset_x, boxes[from].bottom() + offset_y);
        let end = (boxes[to].cx + offset_x, boxes[to].top() + offset_y);
        let mid_y = (start.1 + end.1) / 2.0;
        let dash = match edge.style {
            EdgeStyle::Solid => "",
            EdgeStyle::Dashed => " stroke-dasharray=\"6 4\"",
        };
        svg.push_str(&format!(
            "<path d=\"M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"{} marker-end=\"url(#arrow)\"/>",
            start.0,
            start.1,
            start.0,
            mid_y,
            end.0,
            mid_y,
            end.0,
            end.1,
            theme.line_color,
            dash
        ));
    }

    for (node, b) in diagram.nodes.iter().zip(&boxes) {
        svg.push_str(&node_svg(node, b, offset_x, offset_y, theme, config));
    }

    svg.push_str("</svg>");
    svg
}

fn node_fill<'a>(node: &DiagramNode, theme: &'a Theme) -> &'a str {
    match node.kind {
        NodeKind::Visual => theme.visual_color.as_str(),
        NodeKind::Placeholder | NodeKind::Empty => theme.placeholder_color.as_str(),
        NodeKind::Heading | NodeKind::Subheading => theme.level_fill(node.display_level()),
    }
}

fn node_svg(
    node: &DiagramNode,
    b: &NodeBox,
    offset_x: f32,
    offset_y: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let x = b.left() + offset_x;
    let y = b.top() + offset_y;
    let dash = if node.kind == NodeKind::Visual {
        " stroke-dasharray=\"4 3\""
    } else {
        ""
    };
    let mut out = format!(
        "<g class=\"node {}\" data-id=\"{}\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"{dash}/>",
        node.kind.as_str(),
        escape_xml(&node.id),
        b.width,
        b.height,
        node_fill(node, theme),
        theme.border_color,
    );

    let font_size = match node.kind {
        NodeKind::Visual => theme.font_size * 0.85,
        _ => theme.level_font_size(node.display_level()),
    };
    let block = crate::layout::measure_label(&node.label, node.kind, &config.label);
    let inner_width = (b.width - config.label.padding_x).max(font_size);
    let max_lines = ((b.height - config.label.padding_y) / (font_size * 1.3)).floor().max(1.0) as usize;
    let mut lines: Vec<String> = block
        .lines
        .iter()
        .take(max_lines)
        .map(|line| fit_to_width(line, inner_width, font_size, &theme.font_family))
        .collect();
    if block.lines.len() > max_lines
        && let Some(last) = lines.last_mut()
    {
        let marked = format!("{} …", last.trim_end_matches('…'));
        *last = fit_to_width(&marked, inner_width, font_size, &theme.font_family);
    }

    let line_height = font_size * 1.3;
    let total = lines.len() as f32 * line_height;
    let cx = b.cx + offset_x;
    let start_y = b.cy + offset_y - total / 2.0 + font_size;
    out.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{font_size:.1}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.text_color
    ));
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 {
            out.push_str(&format!("<tspan x=\"{cx:.2}\">{}</tspan>", escape_xml(line)));
        } else {
            out.push_str(&format!(
                "<tspan x=\"{cx:.2}\" dy=\"{line_height:.2}\">{}</tspan>",
                escape_xml(line)
            ));
        }
    }
    out.push_str("</text>");
    if node.page_reference > 0 && !node.kind.is_fallback() {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-family=\"{}\" font-size=\"{:.1}\" fill=\"{}\">p.{}</text>",
            b.right() + offset_x - 6.0,
            b.bottom() + offset_y - 5.0,
            escape_xml(&theme.font_family),
            font_size * 0.7,
            theme.line_color,
            node.page_reference
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(first) = theme.font_family.split(',').next() {
        opt.font_family = first.trim().trim_matches('"').to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DocumentStructure, DocumentStructureResponse, Subheading, VisualReference};
    use crate::layout::{compute_layout, empty_diagram};

    #[test]
    fn render_svg_basic() {
        let mut intro = DocumentStructure::new("Intro & Overview");
        let mut basics = Subheading::new("Basics");
        basics.visual_references.push(VisualReference::new("Diagram"));
        intro.subheadings.push(basics);
        let response = DocumentStructureResponse::new(vec![intro]);
        let config = LayoutConfig::default();
        let diagram = compute_layout(&response, "doc", &config);
        let svg = render_svg(&diagram, &Theme::modern(), &config, &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Intro &amp; Overview"));
        assert!(svg.contains("Basics"));
        assert!(svg.contains("stroke-dasharray=\"6 4\""));
    }

    #[test]
    fn renders_fallback_diagram() {
        let config = LayoutConfig::default();
        let svg = render_svg(&empty_diagram("doc"), &Theme::classic(), &config, &RenderConfig::default());
        assert!(svg.contains("class=\"node empty\""));
        assert!(!svg.contains("p.1"));
    }
}
