use proptest::prelude::*;
use springbox_graph::{Error, Graph, GraphNode};

fn fixture(name: &str) -> String {
    let path = format!("{}/../../fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

#[test]
fn fixtures_load_in_file_order() {
    let g = Graph::from_text(&fixture("test_graph_4.txt")).unwrap();
    assert_eq!(
        g.node_ids().collect::<Vec<_>>(),
        vec!["D25", "D13", "m1", "D97", "D98", "D50", "D51"]
    );
    assert_eq!(g.edge_count(), 6);
    assert!(g.has_edge("D97", "D50"));

    let d50 = g.node("D50").unwrap();
    assert_eq!((d50.left, d50.top, d50.width(), d50.height()), (149.0, 184.0, 242.0, 112.0));

    for name in ["test_graph_1.txt", "test_graph_2.txt", "test_graph_3.txt"] {
        let g = Graph::from_text(&fixture(name)).unwrap();
        assert!(g.len() >= 3, "{name}");
        assert_eq!(g.edge_count(), 0, "{name}");
    }
}

#[test]
fn writer_output_matches_the_documented_layout() {
    let mut g = Graph::new();
    g.add_node(GraphNode::with_default_size("A", 0.0, 0.0).unwrap())
        .unwrap();
    g.add_node(GraphNode::new("B", 12.5, -3.0, 100.0, 40.0).unwrap())
        .unwrap();
    g.add_edge("A", "B").unwrap();

    assert_eq!(
        g.to_text(),
        "{'type':'node', 'id':'A', 'x':0, 'y':0, 'width':60, 'height':60}\n\
         {'type':'node', 'id':'B', 'x':12.5, 'y':-3, 'width':100, 'height':40}\n\
         {'type':'edge', 'source':'A', 'target':'B'}\n"
    );
}

#[test]
fn loose_syntax_is_accepted() {
    let text = r#"
# comment
type=node, id=a, x=1, y=2, width=3, height=4, colour=red
{"type": "node", "id": "b c", "x": 5, "y": 6, "width": 7, "height": 8,}

{type:edge, source:a, target:'b c'}
"#;
    let g = Graph::from_text(text).unwrap();
    assert_eq!(g.len(), 2);
    assert_eq!(g.node("b c").unwrap().right(), 12.0);
    assert!(g.has_edge("a", "b c"));
}

#[test]
fn edges_may_precede_their_endpoints() {
    let text = "\
{'type':'edge', 'source':'x', 'target':'y'}
{'type':'node', 'id':'x', 'x':0, 'y':0, 'width':10, 'height':10}
{'type':'node', 'id':'y', 'x':50, 'y':0, 'width':10, 'height':10}
";
    let g = Graph::from_text(text).unwrap();
    assert!(g.has_edge("x", "y"));
}

#[test]
fn errors_carry_the_line_number_and_leave_the_graph_untouched() {
    let mut g = Graph::from_text(&fixture("test_graph_1.txt")).unwrap();
    let before = g.to_text();

    let cases = [
        ("{'type':'node', 'id':'a', 'x':0, 'y':0, 'width':10}", 1),
        ("\n\n{'type':'node', 'id':'a', 'x':zero, 'y':0, 'width':10, 'height':10}", 3),
        ("{'type':'blob'}", 1),
        ("{'id':'a'}", 1),
        ("{'type':'node', 'id':'a', 'x':0, 'y':0, 'width':-10, 'height':10}", 1),
        ("{'type':'node', 'id':'a', 'x':0, 'y':0, 'width':10, 'height':10", 1),
        (
            "{'type':'node', 'id':'a', 'x':0, 'y':0, 'width':10, 'height':10}\n\
             {'type':'node', 'id':'a', 'x':5, 'y':5, 'width':10, 'height':10}",
            2,
        ),
        (
            "{'type':'node', 'id':'a', 'x':0, 'y':0, 'width':10, 'height':10}\n\
             # trailing edge\n\
             {'type':'edge', 'source':'a', 'target':'ghost'}",
            3,
        ),
    ];

    for (text, line) in cases {
        let err = g.load_from_text(text).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{text}: {err}");
        assert_eq!(err.line(), Some(line), "{text}: {err}");
        assert_eq!(g.to_text(), before, "graph changed after {text}");
    }
}

#[test]
fn load_replaces_previous_contents() {
    let mut g = Graph::from_text(&fixture("test_graph_4.txt")).unwrap();
    g.load_from_text(&fixture("test_graph_1.txt")).unwrap();
    assert_eq!(g.len(), 3);
    assert_eq!(g.edge_count(), 0);

    g.load_from_text("").unwrap();
    assert!(g.is_empty());
}

#[test]
fn ids_with_line_breaks_survive_a_round_trip() {
    let mut g = Graph::new();
    g.add_node(GraphNode::with_default_size("a\nb", 0.0, 0.0).unwrap())
        .unwrap();
    g.add_node(GraphNode::with_default_size("c\r\n", 100.0, 0.0).unwrap())
        .unwrap();
    g.add_edge("a\nb", "c\r\n").unwrap();

    let text = g.to_text();
    assert_eq!(text.lines().count(), 3, "{text}");
    assert!(text.starts_with("{'type':'node', 'id':'a\\nb', "), "{text}");

    let back = Graph::from_text(&text).unwrap();
    assert_eq!(back.node_ids().collect::<Vec<_>>(), vec!["a\nb", "c\r\n"]);
    assert!(back.has_edge("a\nb", "c\r\n"));
    assert_eq!(back.to_text(), text);
}

fn arb_graph() -> impl Strategy<Value = Graph> {
    let ids = proptest::collection::hash_set("[a-zA-Z0-9 '\"\\\\{}:=,#\n\r]{1,8}", 1..8);
    ids.prop_flat_map(|ids| {
        let ids: Vec<String> = ids.into_iter().collect();
        let n = ids.len();
        let boxes = proptest::collection::vec(
            (-1.0e6..1.0e6f64, -1.0e6..1.0e6f64, 0.5..1.0e4f64, 0.5..1.0e4f64),
            n,
        );
        let edges = proptest::collection::vec((0..n, 0..n), 0..12);
        (Just(ids), boxes, edges)
    })
    .prop_map(|(ids, boxes, edges)| {
        let mut g = Graph::new();
        for (id, (x, y, w, h)) in ids.iter().zip(boxes) {
            g.add_node(GraphNode::new(id.clone(), x, y, w, h).unwrap())
                .unwrap();
        }
        for (a, b) in edges {
            g.add_edge(&ids[a], &ids[b]).unwrap();
        }
        g
    })
}

proptest! {
    #[test]
    fn written_text_reloads_to_the_same_graph(g in arb_graph()) {
        let text = g.to_text();
        let back = Graph::from_text(&text).unwrap();

        prop_assert_eq!(back.len(), g.len());
        for (a, b) in g.nodes().zip(back.nodes()) {
            prop_assert_eq!(a, b);
        }
        prop_assert_eq!(
            g.edges().collect::<Vec<_>>(),
            back.edges().collect::<Vec<_>>()
        );
        prop_assert_eq!(back.to_text(), text);
    }
}
