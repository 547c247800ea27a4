//! Maximum-weight perfect bipartite matching via the Hungarian method
//! (§4.G step 3): feasible dual labels on both sides, an augmenting tree
//! grown over the equality subgraph, relabeling by the minimum slack outside
//! the tree when stuck, repeated until every left node is matched.
//!
//! Implemented as a minimum-cost assignment over `cost[i][j]`; matching
//! `cost = -weight` makes this identical to the spec's max-weight
//! formulation, and minimizing total shortest-path distance directly is
//! both equivalent and easier to state correctly.

/// Returns, for each row `i`, the column it is matched to. `cost` must be
/// square.
pub fn min_cost_assignment(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }

    // 1-indexed throughout, following the classical formulation: column 0
    // is a sentinel meaning "no row matched yet".
    let mut label_row = vec![0.0; n + 1];
    let mut label_col = vec![0.0; n + 1];
    let mut match_of_col = vec![0usize; n + 1];
    let mut parent = vec![0usize; n + 1];

    for root in 1..=n {
        match_of_col[0] = root;
        let mut current_col = 0usize;
        let mut slack = vec![f64::INFINITY; n + 1];
        let mut in_tree = vec![false; n + 1];

        loop {
            in_tree[current_col] = true;
            let row = match_of_col[current_col];
            let mut delta = f64::INFINITY;
            let mut next_col = 0usize;

            for col in 1..=n {
                if in_tree[col] {
                    continue;
                }
                let reduced = cost[row - 1][col - 1] - label_row[row] - label_col[col];
                if reduced < slack[col] {
                    slack[col] = reduced;
                    parent[col] = current_col;
                }
                if slack[col] < delta {
                    delta = slack[col];
                    next_col = col;
                }
            }

            for col in 0..=n {
                if in_tree[col] {
                    label_row[match_of_col[col]] += delta;
                    label_col[col] -= delta;
                } else {
                    slack[col] -= delta;
                }
            }

            current_col = next_col;
            if match_of_col[current_col] == 0 {
                break;
            }
        }

        // Augment along the path recorded in `parent`, flipping matched-ness.
        while current_col != 0 {
            let prev = parent[current_col];
            match_of_col[current_col] = match_of_col[prev];
            current_col = prev;
        }
    }

    let mut assignment = vec![0usize; n];
    for col in 1..=n {
        if match_of_col[col] != 0 {
            assignment[match_of_col[col] - 1] = col - 1;
        }
    }
    assignment
}
