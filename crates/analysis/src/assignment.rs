//! Exact minimum-cost assignment.
//!
//! The correspondence solver needs a perfect bipartite matching that
//! minimizes total pair cost. Greedy nearest-neighbor matching is unstable
//! under block reordering and swaps and produces non-reproducible diffs, so
//! this is the Hungarian algorithm with row/column potentials, O(n³).
//! Rows augment in index order and ties between equal-cost columns resolve
//! to the lowest index, which makes repeated runs on the same matrix yield
//! the identical assignment.

/// Solves the square assignment problem for `cost`, returning the column
/// assigned to each row. An empty matrix yields an empty assignment.
pub fn solve(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }
    debug_assert!(cost.iter().all(|row| row.len() == n));

    // 1-based arrays; p[j] is the row matched to column j, column 0 is the
    // virtual free column that each augmentation starts from.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Walk the augmenting path back, flipping matches along the way.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

/// Total cost of an assignment over the given matrix.
pub fn total_cost(cost: &[Vec<f64>], assignment: &[usize]) -> f64 {
    assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| cost[row][col])
        .sum()
}
