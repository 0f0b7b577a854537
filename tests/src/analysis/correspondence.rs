use relict_analysis::{Weights, classify_edges, match_graphs};
use relict_core::{Cfg, Vertex};

fn diamond() -> Cfg {
    let mut g = Cfg::new();
    let blocks = [
        ("NodeA", 0, vec!["%c = icmp eq i32 %x, 0", "br i1 %c, label %t, label %f"]),
        ("NodeB", 1, vec!["%1 = call i32 @strcpy(ptr %d, ptr %s)", "br label %m"]),
        ("NodeC", 2, vec!["%2 = add i32 %x, 1", "br label %m"]),
        ("NodeD", 3, vec!["ret void"]),
    ];
    for (name, ssa, instrs) in blocks {
        let instrs = instrs.into_iter().map(str::to_string).collect();
        g.add_vertex(Vertex::new(name, ssa, instrs)).unwrap();
    }
    g.add_edge("NodeA", "NodeB", Some("T".into())).unwrap();
    g.add_edge("NodeA", "NodeC", Some("F".into())).unwrap();
    g.add_edge("NodeB", "NodeD", None).unwrap();
    g.add_edge("NodeC", "NodeD", None).unwrap();
    g.assign_levels().unwrap();
    g
}

fn weights() -> Weights {
    Weights::default().validated().unwrap()
}

#[test]
fn identical_graphs_produce_an_identity_correspondence() {
    crate::init_tracing();
    let g = diamond();
    let diff = match_graphs(&g, &g, &weights());

    assert_eq!(diff.same.len(), 4);
    assert!(diff.diff.is_empty());
    assert!(diff.total_cost.abs() < 1e-9);
    for name in g.vertex_names() {
        assert_eq!(diff.match_forward(name), Some(name));
    }

    let edges = classify_edges(&g, &g, &diff);
    assert_eq!(edges.conserved.len(), 4);
    assert!(edges.deleted.is_empty());
    assert!(edges.added.is_empty());
}

#[test]
fn size_mismatch_pads_the_smaller_side() {
    let big = diamond();
    let mut small = Cfg::new();
    small
        .add_vertex(Vertex::new(
            "NodeX",
            0,
            vec!["ret void".to_string()],
        ))
        .unwrap();
    small.assign_levels().unwrap();

    let diff = match_graphs(&big, &small, &weights());
    assert_eq!(diff.same.len() + diff.diff.len(), 4);
    let padded = diff.pairs().filter(|p| p.new.is_padding()).count();
    assert_eq!(padded, 3);
    // A pair with a padding side can never be "same".
    assert!(diff.same.iter().all(|p| !p.touches_padding()));
    assert_eq!(
        diff.diff.iter().filter(|p| p.touches_padding()).count(),
        3
    );
    // Padding never enters the identity maps.
    assert!(diff.forward.len() <= 1);
    assert_eq!(diff.forward.len(), diff.backward.len());
}

#[test]
fn forward_and_backward_maps_are_inverse() {
    let old = diamond();
    let mut new = diamond();
    new.add_vertex(Vertex::new(
        "NodeE",
        4,
        vec!["%3 = mul i32 %x, 2".to_string(), "br label %m".to_string()],
    ))
    .unwrap();
    new.add_edge("NodeA", "NodeE", None).unwrap();
    new.assign_levels().unwrap();

    let diff = match_graphs(&old, &new, &weights());
    for (o, n) in &diff.forward {
        assert_eq!(diff.backward.get(n), Some(o));
    }
    for (n, o) in &diff.backward {
        assert_eq!(diff.forward.get(o), Some(n));
    }
}

/// Same blocks as [`diamond`], but the false branch loops back through
/// NodeB instead of joining the exit directly.
fn rewired_diamond() -> Cfg {
    let source = diamond();
    let mut g = Cfg::new();
    for name in source.vertex_names() {
        let v = source.vertex(name).unwrap();
        g.add_vertex(Vertex::new(name, v.ssa_id, v.instructions.clone()))
            .unwrap();
    }
    g.add_edge("NodeA", "NodeB", Some("T".into())).unwrap();
    g.add_edge("NodeA", "NodeC", Some("F".into())).unwrap();
    g.add_edge("NodeB", "NodeD", None).unwrap();
    g.add_edge("NodeC", "NodeB", None).unwrap();
    g.assign_levels().unwrap();
    g
}

#[test]
fn rewired_edges_split_into_deleted_and_added() {
    let old = diamond();
    let new = rewired_diamond();

    let diff = match_graphs(&old, &new, &weights());
    let edges = classify_edges(&old, &new, &diff);

    assert_eq!(edges.conserved.len(), 3);
    assert_eq!(edges.deleted.len(), 1);
    assert_eq!(edges.deleted[0].src, "NodeC");
    assert_eq!(edges.deleted[0].dst, "NodeD");
    assert_eq!(edges.added.len(), 1);
    assert_eq!(edges.added[0].src, "NodeC");
    assert_eq!(edges.added[0].dst, "NodeB");
}

#[test]
fn edge_conservation_is_symmetric_across_swapped_inputs() {
    let old = diamond();
    let new = rewired_diamond();

    let forward = classify_edges(&old, &new, &match_graphs(&old, &new, &weights()));
    let inverse = classify_edges(&new, &old, &match_graphs(&new, &old, &weights()));

    // An edge conserved from old to new must be conserved from new to old
    // with the sides swapped, and vice versa.
    let key = |pair: &(relict_core::EdgeRecord, relict_core::EdgeRecord)| {
        let (a, b) = pair;
        (a.src.clone(), a.dst.clone(), b.src.clone(), b.dst.clone())
    };
    let mut via_forward: Vec<_> = forward.conserved.iter().map(key).collect();
    let mut via_inverse: Vec<_> = inverse
        .conserved
        .iter()
        .map(|(a, b)| (b.src.clone(), b.dst.clone(), a.src.clone(), a.dst.clone()))
        .collect();
    via_forward.sort();
    via_inverse.sort();
    assert_eq!(via_forward, via_inverse);

    // The deleted set of one direction is the added set of the other.
    let ends = |e: &relict_core::EdgeRecord| (e.src.clone(), e.dst.clone());
    let mut deleted: Vec<_> = forward.deleted.iter().map(ends).collect();
    let mut mirrored_added: Vec<_> = inverse.added.iter().map(ends).collect();
    deleted.sort();
    mirrored_added.sort();
    assert_eq!(deleted, mirrored_added);
}

#[test]
fn repeated_matchings_are_identical() {
    let old = diamond();
    let new = rewired_diamond();

    let first = match_graphs(&old, &new, &weights());
    for _ in 0..10 {
        let again = match_graphs(&old, &new, &weights());
        assert_eq!(again.forward, first.forward);
        assert_eq!(again.backward, first.backward);
        assert_eq!(again.total_cost, first.total_cost);
        let names = |pairs: &[relict_analysis::MatchedPair]| {
            pairs
                .iter()
                .map(|p| (p.old.name.clone(), p.new.name.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&again.same), names(&first.same));
        assert_eq!(names(&again.diff), names(&first.diff));
    }
}

#[test]
fn empty_graphs_yield_an_empty_correspondence() {
    let empty = Cfg::new();
    let diff = match_graphs(&empty, &empty, &weights());
    assert!(diff.same.is_empty());
    assert!(diff.diff.is_empty());
    assert_eq!(diff.total_cost, 0.0);
}
