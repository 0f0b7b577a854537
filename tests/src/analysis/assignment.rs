use relict_analysis::assignment::{solve, total_cost};

fn is_permutation(assignment: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    assignment.iter().all(|&c| {
        c < n && !std::mem::replace(&mut seen[c], true)
    })
}

#[test]
fn recovers_a_shifted_zero_diagonal() {
    let n = 5;
    let cost: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if j == (i + 2) % n { 0.0 } else { 1.0 }).collect())
        .collect();

    let assignment = solve(&cost);
    assert!(is_permutation(&assignment, n));
    for (i, &j) in assignment.iter().enumerate() {
        assert_eq!(j, (i + 2) % n);
    }
    assert_eq!(total_cost(&cost, &assignment), 0.0);
}

#[test]
fn never_worse_than_the_identity_assignment() {
    let cost = vec![
        vec![0.9, 0.1, 0.4, 0.7],
        vec![0.2, 0.8, 0.6, 0.3],
        vec![0.5, 0.5, 0.1, 0.9],
        vec![0.3, 0.6, 0.8, 0.2],
    ];
    let assignment = solve(&cost);
    assert!(is_permutation(&assignment, 4));

    let identity: f64 = (0..4).map(|i| cost[i][i]).sum();
    assert!(total_cost(&cost, &assignment) <= identity + 1e-12);
}

#[test]
fn repeated_solves_are_identical() {
    let cost = vec![
        vec![0.5, 0.5, 0.2],
        vec![0.2, 0.5, 0.5],
        vec![0.5, 0.2, 0.5],
    ];
    let first = solve(&cost);
    for _ in 0..10 {
        assert_eq!(solve(&cost), first);
    }
}
