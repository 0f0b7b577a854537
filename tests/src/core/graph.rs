use relict_core::{Cfg, Error, Vertex};

fn block(name: &str, ssa: i64) -> Vertex {
    Vertex::new(name, ssa, vec!["ret void".into()])
}

#[test]
fn duplicate_identity_is_rejected() {
    let mut g = Cfg::new();
    g.add_vertex(block("NodeA", 0)).unwrap();
    let err = g.add_vertex(block("NodeA", 1)).unwrap_err();
    assert!(matches!(err, Error::DuplicateVertex(name) if name == "NodeA"));
}

#[test]
fn padding_vertices_bypass_the_identity_index() {
    let mut g = Cfg::new();
    g.add_vertex(block("NodeA", 0)).unwrap();
    g.add_vertex(Vertex::padding()).unwrap();
    g.add_vertex(Vertex::padding()).unwrap();

    assert_eq!(g.vertex_count(), 3);
    assert_eq!(g.vertex_names(), vec!["NodeA"]);
}

#[test]
fn entry_requires_exactly_one_root() {
    let mut g = Cfg::new();
    g.add_vertex(block("NodeA", 0)).unwrap();
    g.add_vertex(block("NodeB", 1)).unwrap();
    assert!(matches!(
        g.assign_levels().unwrap_err(),
        Error::MultipleEntryBlocks(2)
    ));

    let empty = Cfg::new();
    assert!(matches!(empty.entry().unwrap_err(), Error::NoEntryBlock));
}

#[test]
fn neighbors_reflect_edge_direction() {
    let mut g = Cfg::new();
    for (name, ssa) in [("NodeA", 0), ("NodeB", 1), ("NodeC", 2)] {
        g.add_vertex(block(name, ssa)).unwrap();
    }
    g.add_edge("NodeA", "NodeB", None).unwrap();
    g.add_edge("NodeA", "NodeC", Some("F".into())).unwrap();

    let mut succ = g.successors("NodeA");
    succ.sort_unstable();
    assert_eq!(succ, vec!["NodeB", "NodeC"]);
    assert_eq!(g.predecessors("NodeB"), vec!["NodeA"]);
    assert!(g.successors("NodeB").is_empty());
    assert!(g.successors("NodeMissing").is_empty());
}

#[test]
fn duplicate_edges_are_kept() {
    let mut g = Cfg::new();
    g.add_vertex(block("NodeA", 0)).unwrap();
    g.add_vertex(block("NodeB", 1)).unwrap();
    g.add_edge("NodeA", "NodeB", Some("T".into())).unwrap();
    g.add_edge("NodeA", "NodeB", Some("F".into())).unwrap();

    assert_eq!(g.edge_count(), 2);
    assert!(g.has_edge("NodeA", "NodeB"));
}
