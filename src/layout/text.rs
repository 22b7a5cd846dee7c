use crate::config::LabelConfig;

use super::{DiagramNode, NodeBox, NodeKind, TextBlock};

fn char_width_for(kind: NodeKind, config: &LabelConfig) -> f32 {
    match kind {
        NodeKind::Heading => config.heading_char_width,
        _ => config.char_width,
    }
    .max(1.0)
}

/// Wraps a label into lines that fit the widest allowed box, using a fixed
/// per-character width estimate.
pub fn measure_label(text: &str, kind: NodeKind, config: &LabelConfig) -> TextBlock {
    let char_width = char_width_for(kind, config);
    let max_text_width = match kind {
        NodeKind::Visual => config.visual_width - config.padding_x,
        _ => config.max_width - config.padding_x * 2.0,
    };
    let max_chars = ((max_text_width / char_width).floor() as usize).max(1);
    let lines = wrap_words(text, max_chars);
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    TextBlock {
        width: longest as f32 * char_width,
        height: lines.len() as f32 * config.line_height,
        lines,
    }
}

/// Estimated on-screen box of a node. Visual nodes get a fixed smaller box;
/// everything else grows with its label up to the configured caps.
pub fn node_box(node: &DiagramNode, config: &LabelConfig) -> NodeBox {
    let (width, height) = match node.kind {
        NodeKind::Visual => (config.visual_width, config.visual_height),
        kind => {
            let block = measure_label(&node.label, kind, config);
            let width = (block.width + config.padding_x * 2.0)
                .max(config.min_width)
                .min(config.max_width);
            let height = (block.height + config.padding_y * 2.0).min(config.max_height);
            (width, height)
        }
    };
    NodeBox {
        cx: node.position.x,
        cy: node.position.y,
        width,
        height,
    }
}

pub(super) fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word_chars: Vec<char> = word.chars().collect();
        // Words wider than a full line are split hard.
        while word_chars.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word_chars.split_off(max_chars);
            lines.push(word_chars.into_iter().collect());
            word_chars = rest;
        }
        if word_chars.is_empty() {
            continue;
        }
        let needed = if current_len == 0 {
            word_chars.len()
        } else {
            current_len + 1 + word_chars.len()
        };
        if needed > max_chars && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word_chars.iter());
        current_len += word_chars.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Position;

    fn node(kind: NodeKind, label: &str) -> DiagramNode {
        DiagramNode::new("n".to_string(), kind, label.to_string(), 2, Position::default())
    }

    #[test]
    fn wraps_long_labels() {
        let lines = wrap_words("this is a long label", 8);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.chars().count() <= 8));
    }

    #[test]
    fn splits_oversized_words() {
        let lines = wrap_words("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn empty_label_keeps_one_line() {
        assert_eq!(wrap_words("", 10), vec![String::new()]);
    }

    #[test]
    fn longer_labels_get_wider_boxes_up_to_cap() {
        let config = LabelConfig::default();
        let short = node_box(&node(NodeKind::Subheading, "Intro to the basics"), &config);
        let long = node_box(
            &node(NodeKind::Subheading, "An introduction to every basic concept in detail"),
            &config,
        );
        assert!(long.width > short.width);
        assert!(long.width <= config.max_width);

        let huge = node_box(&node(NodeKind::Subheading, &"word ".repeat(200)), &config);
        assert!(huge.width <= config.max_width);
        assert_eq!(huge.height, config.max_height);
    }

    #[test]
    fn visual_boxes_are_fixed() {
        let config = LabelConfig::default();
        let a = node_box(&node(NodeKind::Visual, "Fig"), &config);
        let b = node_box(&node(NodeKind::Visual, &"caption ".repeat(20)), &config);
        assert_eq!((a.width, a.height), (b.width, b.height));
        assert_eq!(a.width, config.visual_width);
    }
}
