use relict_analysis::metric::{instruction_distance, normalized_edit_distance, vertex_cost};
use relict_analysis::{Error, Weights};
use relict_core::{Cfg, Vertex};

fn ops(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn single(name: &str, instrs: &[&str]) -> Cfg {
    let mut g = Cfg::new();
    g.add_vertex(Vertex::new(name, 0, ops(instrs))).unwrap();
    g.assign_levels().unwrap();
    g
}

#[test]
fn distances_stay_inside_the_unit_interval() {
    let cases = [
        (ops(&["load", "add", "store"]), ops(&["load", "mul", "store"])),
        (ops(&["br"]), ops(&["call strcpy", "br", "ret"])),
        (ops(&[]), ops(&["ret"])),
        (ops(&[]), ops(&[])),
    ];
    for (a, b) in &cases {
        let d = normalized_edit_distance(a, b);
        assert!((0.0..=1.0).contains(&d), "out of range: {d}");
        let blended = instruction_distance(a, b);
        assert!((0.0..=1.0).contains(&blended), "out of range: {blended}");
    }
}

#[test]
fn call_targets_dominate_opcode_churn() {
    // Heavy opcode churn around an identical call target.
    let a = ops(&["load", "add", "call memcpy", "store", "br"]);
    let b = ops(&["mul", "sub", "call memcpy", "xor", "ret"]);
    let same_call = instruction_distance(&a, &b);

    // Identical opcodes around a different call target.
    let c = ops(&["load", "add", "call memcpy", "store", "br"]);
    let d = ops(&["load", "add", "call strncpy", "store", "br"]);
    let changed_call = instruction_distance(&c, &d);

    assert!(same_call < changed_call);
}

#[test]
fn vertex_cost_is_zero_for_identical_blocks_and_one_against_padding() {
    let weights = Weights::default().validated().unwrap();
    let g = single("NodeA", &["%0 = load i32, ptr %p", "ret i32 %0"]);
    let idx = g.index_of("NodeA").unwrap();

    assert!(vertex_cost(&weights, &g, idx, &g, idx).abs() < 1e-12);

    let mut padded = Cfg::new();
    let pad_a = padded.add_vertex(Vertex::padding()).unwrap();
    let pad_b = padded.add_vertex(Vertex::padding()).unwrap();
    assert_eq!(vertex_cost(&weights, &g, idx, &padded, pad_a), 1.0);
    assert_eq!(vertex_cost(&weights, &padded, pad_a, &padded, pad_b), 0.0);
}

#[test]
fn unreachable_block_forces_the_level_term() {
    let weights = Weights {
        instruction: 0.0,
        level: 1.0,
        in_degree: 0.0,
        out_degree: 0.0,
    }
    .validated()
    .unwrap();

    let mut g = Cfg::new();
    g.add_vertex(Vertex::new("NodeA", 0, ops(&["ret void"]))).unwrap();
    g.add_vertex(Vertex::new("NodeB", 1, ops(&["ret void"]))).unwrap();
    g.add_vertex(Vertex::new("NodeC", 2, ops(&["ret void"]))).unwrap();
    g.add_edge("NodeB", "NodeC", None).unwrap();
    g.add_edge("NodeC", "NodeB", None).unwrap();
    g.assign_levels().unwrap();

    let reachable = g.index_of("NodeA").unwrap();
    let unreachable = g.index_of("NodeB").unwrap();
    assert_eq!(vertex_cost(&weights, &g, reachable, &g, unreachable), 1.0);
    assert_eq!(vertex_cost(&weights, &g, reachable, &g, reachable), 0.0);
}

#[test]
fn weights_must_sum_to_one() {
    let invalid = Weights {
        instruction: 0.5,
        level: 0.5,
        in_degree: 0.5,
        out_degree: 0.5,
    };
    assert!(matches!(
        invalid.validated().unwrap_err(),
        Error::InvalidWeights(sum) if (sum - 2.0).abs() < 1e-9
    ));
}

#[test]
fn weight_overrides_parse_and_validate() {
    let parsed = Weights::parse("0.4, 0.3, 0.2, 0.1").unwrap();
    assert_eq!(parsed.instruction, 0.4);
    assert_eq!(parsed.out_degree, 0.1);

    assert!(matches!(
        Weights::parse("0.4, 0.3, 0.3").unwrap_err(),
        Error::InvalidWeightSpec(_)
    ));
    assert!(matches!(
        Weights::parse("a,b,c,d").unwrap_err(),
        Error::InvalidWeightSpec(_)
    ));
    assert!(matches!(
        Weights::parse("0.9, 0.9, 0.1, 0.1").unwrap_err(),
        Error::InvalidWeights(_)
    ));
}
