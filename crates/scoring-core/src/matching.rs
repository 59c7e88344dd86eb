//! Bipartite matching.
//!
//! Two algorithms over explicit structures:
//! - [`max_weight_matching`]: Hungarian (Kuhn–Munkres) with row/column
//!   potentials over a dense weight matrix, `O(n² m)`.
//! - [`max_cardinality_matching`]: Kuhn's augmenting paths over an adjacency
//!   list, `O(V E)`.

/// Maximum-weight matching over a `rows × cols` weight matrix.
///
/// A weight of zero or less means "no edge": the result only contains pairs
/// with positive weight, so it maximizes total weight, not cardinality.
/// Returns `(row, col)` pairs sorted by row. Equal-weight alternatives resolve
/// in favor of whatever the augmentation order reaches first, which is
/// deterministic for a given matrix.
pub fn max_weight_matching(weights: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = weights.len();
    let cols = weights.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let weight = |r: usize, c: usize| weights[r].get(c).copied().unwrap_or(0.0).max(0.0);

    let mut pairs = if rows <= cols {
        hungarian(rows, cols, |r, c| -weight(r, c))
    } else {
        hungarian(cols, rows, |r, c| -weight(c, r))
            .into_iter()
            .map(|(c, r)| (r, c))
            .collect()
    };
    pairs.retain(|&(r, c)| weight(r, c) > 0.0);
    pairs.sort_unstable();
    pairs
}

/// Minimum-cost assignment of every row to a distinct column (`n <= m`).
fn hungarian(n: usize, m: usize, cost: impl Fn(usize, usize) -> f64) -> Vec<(usize, usize)> {
    // 1-indexed; index 0 is a virtual column/row used to start each augmentation.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut assigned_row = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        assigned_row[0] = i;
        let mut j0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = assigned_row[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let slack = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[assigned_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if assigned_row[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path.
        loop {
            let j1 = way[j0];
            assigned_row[j0] = assigned_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    (1..=m)
        .filter(|&j| assigned_row[j] != 0)
        .map(|j| (assigned_row[j] - 1, j - 1))
        .collect()
}

/// Maximum-cardinality matching for a bipartite graph.
///
/// `adjacency[left]` lists the right-side vertices adjacent to `left`; right
/// indices must be below `num_right`. Left vertices are tried in index order.
/// Returns `(left, right)` pairs sorted by left.
pub fn max_cardinality_matching(adjacency: &[Vec<usize>], num_right: usize) -> Vec<(usize, usize)> {
    let mut match_of_right: Vec<Option<usize>> = vec![None; num_right];

    for left in 0..adjacency.len() {
        let mut visited = vec![false; num_right];
        try_augment(left, adjacency, &mut match_of_right, &mut visited);
    }

    let mut pairs: Vec<(usize, usize)> = match_of_right
        .iter()
        .enumerate()
        .filter_map(|(right, left)| left.map(|l| (l, right)))
        .collect();
    pairs.sort_unstable();
    pairs
}

fn try_augment(
    left: usize,
    adjacency: &[Vec<usize>],
    match_of_right: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &right in &adjacency[left] {
        if right >= visited.len() || visited[right] {
            continue;
        }
        visited[right] = true;
        let free = match match_of_right[right] {
            None => true,
            Some(other) => try_augment(other, adjacency, match_of_right, visited),
        };
        if free {
            match_of_right[right] = Some(left);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn total(weights: &[Vec<f64>], pairs: &[(usize, usize)]) -> f64 {
        pairs.iter().map(|&(r, c)| weights[r][c]).sum()
    }

    /// Exhaustive best total over all partial matchings.
    fn brute_force(weights: &[Vec<f64>], row: usize, used: &mut Vec<bool>) -> f64 {
        if row == weights.len() {
            return 0.0;
        }
        let mut best = brute_force(weights, row + 1, used);
        for c in 0..used.len() {
            if !used[c] && weights[row][c] > 0.0 {
                used[c] = true;
                best = best.max(weights[row][c] + brute_force(weights, row + 1, used));
                used[c] = false;
            }
        }
        best
    }

    #[test]
    fn empty_inputs() {
        assert!(max_weight_matching(&[]).is_empty());
        assert!(max_weight_matching(&[vec![]]).is_empty());
        assert!(max_cardinality_matching(&[], 3).is_empty());
    }

    #[test]
    fn prefers_weight_over_cardinality() {
        // Matching (0,0) alone beats (0,1) + (1,0).
        let weights = vec![vec![1.0, 0.4], vec![0.4, 0.0]];
        assert_eq!(max_weight_matching(&weights), vec![(0, 0)]);
    }

    #[test]
    fn zero_weight_pairs_are_dropped() {
        let weights = vec![vec![0.0, 0.0], vec![0.0, 0.7]];
        assert_eq!(max_weight_matching(&weights), vec![(1, 1)]);
    }

    #[test]
    fn handles_more_rows_than_columns() {
        let weights = vec![vec![0.2], vec![0.9], vec![0.5]];
        assert_eq!(max_weight_matching(&weights), vec![(1, 0)]);
    }

    #[test]
    fn matches_brute_force_on_random_graphs() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let rows = rng.random_range(1..5);
            let cols = rng.random_range(1..5);
            let weights: Vec<Vec<f64>> = (0..rows)
                .map(|_| {
                    (0..cols)
                        .map(|_| {
                            if rng.random_bool(0.3) {
                                0.0
                            } else {
                                rng.random_range(0.0..1.0)
                            }
                        })
                        .collect()
                })
                .collect();

            let pairs = max_weight_matching(&weights);
            let expected = brute_force(&weights, 0, &mut vec![false; cols]);
            assert!(
                (total(&weights, &pairs) - expected).abs() < 1e-9,
                "weights {weights:?} gave {pairs:?}"
            );

            let mut seen_rows = std::collections::HashSet::new();
            let mut seen_cols = std::collections::HashSet::new();
            for &(r, c) in &pairs {
                assert!(seen_rows.insert(r));
                assert!(seen_cols.insert(c));
                assert!(weights[r][c] > 0.0);
            }
        }
    }

    #[test]
    fn cardinality_matching_augments() {
        // Greedy would match 0->0 and leave 1 unmatched.
        let adjacency = vec![vec![0, 1], vec![0]];
        assert_eq!(max_cardinality_matching(&adjacency, 2), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn cardinality_matching_with_isolated_vertices() {
        let adjacency = vec![vec![], vec![2], vec![2]];
        assert_eq!(max_cardinality_matching(&adjacency, 3), vec![(1, 2)]);
    }
}
