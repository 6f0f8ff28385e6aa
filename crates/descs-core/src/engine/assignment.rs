use nalgebra::DMatrix;

/// An optimal row-to-column matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// `columns[row]` is the column matched to `row`, `None` for rows that
    /// only met padding.
    pub columns: Vec<Option<usize>>,
    /// Sum of the real matrix entries of the matching.
    pub cost: f64,
}

impl Assignment {
    /// Matched `(row, column)` pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(row, column)| column.map(|c| (row, c)))
    }
}

/// Minimum-cost assignment (Hungarian method with potentials, O(n³)).
///
/// Rectangular matrices are padded with zero-cost cells to a square, so every
/// row of the smaller side is matched. Ties are broken deterministically by
/// index order.
pub fn solve(costs: &DMatrix<f64>) -> Assignment {
    let (rows, cols) = costs.shape();
    let n = rows.max(cols);
    if n == 0 {
        return Assignment {
            columns: Vec::new(),
            cost: 0.0,
        };
    }
    let cost = |i: usize, j: usize| -> f64 {
        if i < rows && j < cols { costs[(i, j)] } else { 0.0 }
    };

    // 1-based arrays; index 0 is the virtual start column.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut row_of = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        row_of[0] = i;
        let mut j0 = 0;
        let mut min_to = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = row_of[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < min_to[j] {
                    min_to[j] = reduced;
                    way[j] = j0;
                }
                if min_to[j] < delta {
                    delta = min_to[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[row_of[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_to[j] -= delta;
                }
            }
            j0 = j1;
            if row_of[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            row_of[j0] = row_of[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut columns = vec![None; rows];
    let mut total = 0.0;
    for j in 1..=n {
        let (i, c) = (row_of[j] - 1, j - 1);
        if i < rows && c < cols {
            columns[i] = Some(c);
            total += costs[(i, c)];
        }
    }
    Assignment {
        columns,
        cost: total,
    }
}
