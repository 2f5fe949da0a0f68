use serde::{Deserialize, Serialize};

/// Highest polynomial degree used for thrust curves.
pub const MAX_DEGREE: usize = 2;

/// Least-squares polynomial, coefficients in ascending powers of `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialFit {
    pub coefficients: Vec<f64>,
}

impl PolynomialFit {
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluate with Horner's scheme.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }

    /// `samples` evenly spaced points over `[0, max_x]`, negative values
    /// clamped to zero.
    pub fn sample(&self, max_x: f64, samples: usize) -> Vec<(f64, f64)> {
        match samples {
            0 => Vec::new(),
            1 => vec![(0.0, self.evaluate(0.0).max(0.0))],
            n => (0..n)
                .map(|i| {
                    let x = max_x * i as f64 / (n - 1) as f64;
                    (x, self.evaluate(x).max(0.0))
                })
                .collect(),
        }
    }
}

/// Fit a polynomial of degree `min(max_degree, points - 1)`.
///
/// Solves the normal equations by Gaussian elimination with partial
/// pivoting. Returns `None` for an empty input or a singular system (for
/// example when every `x` is identical).
pub fn fit_polynomial(points: &[(f64, f64)], max_degree: usize) -> Option<PolynomialFit> {
    if points.is_empty() {
        return None;
    }
    let degree = max_degree.min(points.len() - 1);
    let n = degree + 1;

    // power_sums[k] = Σ x^k, rhs[k] = Σ y·x^k
    let mut power_sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; n];
    for &(x, y) in points {
        let mut xk = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            *sum += xk;
            if k < n {
                rhs[k] += y * xk;
            }
            xk *= x;
        }
    }

    let mut matrix: Vec<Vec<f64>> = (0..n)
        .map(|row| {
            let mut r: Vec<f64> = (0..n).map(|col| power_sums[row + col]).collect();
            r.push(rhs[row]);
            r
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))?;
        let scale = matrix[pivot][col].abs().max(1.0);
        if matrix[pivot][col].abs() <= f64::EPSILON * scale {
            return None;
        }
        matrix.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..=n {
                let delta = factor * matrix[col][k];
                matrix[row][k] -= delta;
            }
        }
    }

    let mut coefficients = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n)
            .map(|k| matrix[row][k] * coefficients[k])
            .sum();
        coefficients[row] = (matrix[row][n] - tail) / matrix[row][row];
    }

    Some(PolynomialFit { coefficients })
}
