use std::collections::{HashMap, HashSet};
use std::path::Path;

use docmap::layout::{count_overlaps, process_structure};
use docmap::{
    Diagram, DiagramNode, DocumentStructureResponse, EdgeStyle, LayoutConfig, NodeKind, Position,
    Subheading, compute_layout, optimize_layout, read_structure,
};

fn load_fixture(name: &str) -> DocumentStructureResponse {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    read_structure(&path).expect("fixture read failed")
}

fn layout_fixture(name: &str) -> Diagram {
    compute_layout(&load_fixture(name), name, &LayoutConfig::default())
}

fn count_subtree(subs: &[Subheading]) -> usize {
    subs.iter()
        .filter(|sub| sub.label().is_some())
        .map(|sub| 1 + sub.visual_references.len() + count_subtree(&sub.subheadings))
        .sum()
}

fn assert_tree(diagram: &Diagram, fixture: &str) {
    let ids: HashSet<&str> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), diagram.nodes.len(), "{fixture}: duplicate node ids");

    let mut parents: HashMap<&str, &str> = HashMap::new();
    for edge in &diagram.edges {
        assert!(ids.contains(edge.source.as_str()), "{fixture}: dangling source {}", edge.source);
        assert!(ids.contains(edge.target.as_str()), "{fixture}: dangling target {}", edge.target);
        let previous = parents.insert(edge.target.as_str(), edge.source.as_str());
        assert!(previous.is_none(), "{fixture}: {} has two parents", edge.target);
    }
    let roots: Vec<&str> = ids.iter().copied().filter(|id| !parents.contains_key(id)).collect();
    assert_eq!(roots.len(), 1, "{fixture}: expected exactly one root, got {roots:?}");
}

#[test]
fn empty_structure_yields_single_empty_node() {
    let diagram = layout_fixture("empty.json");
    assert_eq!(diagram.nodes.len(), 1);
    assert!(diagram.edges.is_empty());
    assert_eq!(diagram.nodes[0].id, "empty");
    assert_eq!(diagram.nodes[0].kind, NodeKind::Empty);
}

#[test]
fn single_heading_is_level_zero_root() {
    let diagram = layout_fixture("single_heading.json");
    assert_eq!(diagram.nodes.len(), 1);
    assert!(diagram.edges.is_empty());
    let node = &diagram.nodes[0];
    assert_eq!(node.id, "heading-0");
    assert_eq!(node.level, 0);
    assert_eq!(node.kind, NodeKind::Heading);
}

#[test]
fn two_headings_with_nested_visual() {
    let diagram = layout_fixture("two_headings.json");
    assert_eq!(diagram.nodes.len(), 4);
    assert_eq!(diagram.edges.len(), 3);

    let expect = |id: &str, kind: NodeKind, level: u32| -> DiagramNode {
        let node = diagram.node(id).unwrap_or_else(|| panic!("missing {id}")).clone();
        assert_eq!(node.kind, kind, "{id}");
        assert_eq!(node.level, level, "{id}");
        node
    };
    expect("heading-0", NodeKind::Heading, 0);
    expect("heading-1", NodeKind::Heading, 1);
    let basics = expect("subheading-0-2-0", NodeKind::Subheading, 2);
    let visual = expect("visual-0-2-0-0", NodeKind::Visual, 2);
    assert_eq!(basics.label, "Basics");
    assert_eq!(basics.page_reference, 2);
    assert!(basics.context.is_some());
    assert_eq!(visual.label, "Diagram");
    assert_eq!(visual.page_reference, 3);

    let style = |source: &str, target: &str| {
        diagram
            .edge(source, target)
            .unwrap_or_else(|| panic!("missing edge {source} -> {target}"))
            .style
    };
    assert_eq!(style("heading-0", "heading-1"), EdgeStyle::Solid);
    assert_eq!(style("heading-0", "subheading-0-2-0"), EdgeStyle::Solid);
    assert_eq!(style("subheading-0-2-0", "visual-0-2-0-0"), EdgeStyle::Dashed);
}

#[test]
fn untitled_subheading_is_dropped_and_siblings_follow() {
    let diagram = layout_fixture("missing_title.json");
    // Heading, three titled subheadings, one visual.
    assert_eq!(diagram.nodes.len(), 5);
    assert_tree(&diagram, "missing_title.json");

    let setup = diagram.node("subheading-0-2-0").expect("setup");
    let procedure = diagram.node("subheading-0-2-1").expect("procedure");
    let analysis = diagram.node("subheading-0-2-2").expect("analysis");
    assert_eq!(setup.label, "Setup");
    assert_eq!(procedure.label, "Procedure");
    assert_eq!(analysis.label, "Analysis");
    assert!(setup.position.y < procedure.position.y);
    assert!(procedure.position.y < analysis.position.y);

    let visual = diagram.node("visual-0-2-1-0").expect("procedure visual");
    assert_eq!(visual.label, "Image");
    assert_eq!(visual.page_reference, 4);
}

#[test]
fn node_and_edge_counts_match_input() {
    for fixture in ["single_heading.json", "two_headings.json", "missing_title.json", "handbook.json"] {
        let response = load_fixture(fixture);
        let diagram = compute_layout(&response, fixture, &LayoutConfig::default());
        let headings = response.sections().iter().filter(|s| s.label().is_some()).count();
        let expected: usize = headings
            + response
                .sections()
                .iter()
                .map(|s| count_subtree(&s.subheadings))
                .sum::<usize>();
        assert_eq!(diagram.nodes.len(), expected, "{fixture}: node count");
        assert_eq!(diagram.edges.len(), expected - 1, "{fixture}: edge count");
        assert_tree(&diagram, fixture);
    }
}

#[test]
fn handbook_levels_and_duplicates() {
    let diagram = layout_fixture("handbook.json");
    assert_eq!(diagram.nodes.len(), 21);
    let levels: Vec<u32> = ["heading-0", "heading-1", "heading-2", "heading-3"]
        .iter()
        .map(|id| diagram.node(id).expect("heading").level)
        .collect();
    assert_eq!(levels, vec![0, 1, 1, 1]);

    let deep = diagram.node("subheading-1-4-0-0-0").expect("data refresh");
    assert_eq!(deep.label, "Data refresh");
    assert_eq!(deep.level, 4);
    assert_eq!(deep.display_level(), 4);

    let rollouts: Vec<&str> = diagram
        .nodes
        .iter()
        .filter(|n| n.label == "Rollout")
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(rollouts, vec!["subheading-1-2-1", "subheading-1-2-2"]);
}

#[test]
fn layout_is_deterministic() {
    let response = load_fixture("handbook.json");
    let config = LayoutConfig::default();
    let first = compute_layout(&response, "handbook", &config);
    let second = compute_layout(&response, "handbook", &config);
    assert_eq!(first, second);
}

#[test]
fn optimizer_only_moves_positions() {
    let response = load_fixture("handbook.json");
    let config = LayoutConfig::default();
    let initial = process_structure(&response, "handbook", &config.structure);
    let mut optimized = initial.clone();
    let report = optimize_layout(&mut optimized, &config);
    assert!(report.passes <= 3);
    assert_eq!(initial.edges, optimized.edges);
    for (before, after) in initial.nodes.iter().zip(&optimized.nodes) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.kind, after.kind);
        assert_eq!(before.label, after.label);
        assert_eq!(before.level, after.level);
        assert_eq!(before.page_reference, after.page_reference);
    }
}

#[test]
fn sparse_layout_is_left_untouched() {
    let response = load_fixture("two_headings.json");
    let config = LayoutConfig::default();
    let initial = process_structure(&response, "two", &config.structure);
    let mut optimized = initial.clone();
    let report = optimize_layout(&mut optimized, &config);
    assert!(report.converged);
    assert_eq!(report.passes, 1);
    assert_eq!(initial, optimized);
    assert_eq!(count_overlaps(&optimized, &config.label), 0);
}

#[test]
fn stacked_pair_separates_by_overlap_plus_margin() {
    let mut config = LayoutConfig::default();
    config.optimizer.max_passes = 1;
    let node = |id: &str| {
        DiagramNode::new(id.to_string(), NodeKind::Subheading, "Overview".to_string(), 2, Position::new(40.0, 40.0))
    };
    let mut diagram = Diagram {
        nodes: vec![node("a"), node("b")],
        edges: Vec::new(),
    };
    let size = docmap::layout::node_box(&diagram.nodes[0], &config.label);
    optimize_layout(&mut diagram, &config);
    let a = diagram.nodes[0].position;
    let b = diagram.nodes[1].position;
    let separation = (b.x - a.x).abs().max((b.y - a.y).abs());
    let overlap = size.width.min(size.height);
    assert!(separation >= overlap + config.optimizer.margin - 1e-3);
}

#[test]
fn dense_synthetic_input_terminates_within_pass_bound() {
    let mut sections = Vec::new();
    for h in 0..20 {
        let mut heading = docmap::DocumentStructure::new(&format!("Chapter {h}"));
        for s in 0..8 {
            let mut sub = Subheading::new("Section");
            for v in 0..2 {
                sub.visual_references
                    .push(docmap::VisualReference::new(&format!("Figure {h}.{s}.{v}")));
            }
            sub.subheadings.push(Subheading::new("Detail"));
            heading.subheadings.push(sub);
        }
        sections.push(heading);
    }
    let response = DocumentStructureResponse::new(sections);
    let mut config = LayoutConfig::default();
    config.structure.row_height = 10.0;
    config.structure.horizontal_spacing = 5.0;
    let mut diagram = process_structure(&response, "dense", &config.structure);
    assert_eq!(diagram.nodes.len(), 20 * (1 + 8 * 4));
    let report = optimize_layout(&mut diagram, &config);
    assert!(report.passes <= 3);
    assert!(report.node_adjustments > 0);
}
