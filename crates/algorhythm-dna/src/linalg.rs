//! Dense linear algebra over the fixed 9-dimensional feature space.
//!
//! Sample sizes are a few hundred rows at most and every matrix is 9×9, so
//! plain arrays and textbook algorithms (Gauss-Jordan elimination, cyclic
//! Jacobi rotations) are exact enough and keep the descriptor serializable
//! without a matrix library.

use algorhythm_core::{FeatureVector, FEATURE_COUNT};

/// A square matrix over the feature space, row-major.
pub type Matrix = [[f64; FEATURE_COUNT]; FEATURE_COUNT];

const N: usize = FEATURE_COUNT;

/// Upper bound on Jacobi sweeps; 9×9 symmetric inputs converge in well under ten.
const MAX_JACOBI_SWEEPS: usize = 100;

#[must_use]
pub fn identity() -> Matrix {
    let mut m = [[0.0; N]; N];
    for i in 0..N {
        m[i][i] = 1.0;
    }
    m
}

/// Per-column mean using a corrected two-pass sum.
///
/// The second pass removes the rounding error of the first, so a column of
/// identical values has exactly that value as its mean.
#[must_use]
pub fn column_means(rows: &[FeatureVector]) -> FeatureVector {
    if rows.is_empty() {
        return FeatureVector::zeros();
    }
    let n = rows.len() as f64;
    let mut mean = [0.0; N];
    for j in 0..N {
        let first = rows.iter().map(|r| r.as_array()[j]).sum::<f64>() / n;
        let correction = rows.iter().map(|r| r.as_array()[j] - first).sum::<f64>() / n;
        mean[j] = first + correction;
    }
    FeatureVector::new(mean)
}

/// Per-column standard deviation with `ddof` delta degrees of freedom.
///
/// Returns zeros when there are not more rows than `ddof`.
#[must_use]
pub fn column_std(rows: &[FeatureVector], ddof: usize) -> FeatureVector {
    if rows.len() <= ddof {
        return FeatureVector::zeros();
    }
    let mean = column_means(rows);
    let denom = (rows.len() - ddof) as f64;
    let mut std = [0.0; N];
    for j in 0..N {
        let m = mean.as_array()[j];
        let ss: f64 = rows.iter().map(|r| (r.as_array()[j] - m).powi(2)).sum();
        std[j] = (ss / denom).sqrt();
    }
    FeatureVector::new(std)
}

/// Per-column minimum and maximum.
#[must_use]
pub fn column_bounds(rows: &[FeatureVector]) -> (FeatureVector, FeatureVector) {
    let mut min = [f64::INFINITY; N];
    let mut max = [f64::NEG_INFINITY; N];
    for row in rows {
        for (j, &v) in row.as_array().iter().enumerate() {
            min[j] = min[j].min(v);
            max[j] = max[j].max(v);
        }
    }
    if rows.is_empty() {
        return (FeatureVector::zeros(), FeatureVector::zeros());
    }
    (FeatureVector::new(min), FeatureVector::new(max))
}

/// Sample covariance (n − 1 denominator).
#[must_use]
pub fn covariance(rows: &[FeatureVector]) -> Matrix {
    let mut cov = [[0.0; N]; N];
    if rows.len() < 2 {
        return cov;
    }
    let mean = column_means(rows);
    let denom = (rows.len() - 1) as f64;
    for i in 0..N {
        for j in i..N {
            let mi = mean.as_array()[i];
            let mj = mean.as_array()[j];
            let s: f64 = rows
                .iter()
                .map(|r| (r.as_array()[i] - mi) * (r.as_array()[j] - mj))
                .sum();
            cov[i][j] = s / denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Pearson correlation derived from a covariance matrix.
///
/// A zero-variance feature correlates with nothing: its row and column are
/// zero apart from the unit diagonal.
#[must_use]
pub fn correlation(cov: &Matrix) -> Matrix {
    let mut corr = identity();
    for i in 0..N {
        for j in 0..N {
            if i == j {
                continue;
            }
            let denom = (cov[i][i] * cov[j][j]).sqrt();
            corr[i][j] = if denom > 1e-12 {
                (cov[i][j] / denom).clamp(-1.0, 1.0)
            } else {
                0.0
            };
        }
    }
    corr
}

/// `m + epsilon · I`.
#[must_use]
pub fn regularize(m: &Matrix, epsilon: f64) -> Matrix {
    let mut out = *m;
    for i in 0..N {
        out[i][i] += epsilon;
    }
    out
}

/// Matrix inverse by Gauss-Jordan elimination with partial pivoting.
///
/// Returns `None` when a pivot vanishes or the result is not finite.
#[must_use]
pub fn invert(m: &Matrix) -> Option<Matrix> {
    let mut a = *m;
    let mut inv = identity();

    for col in 0..N {
        let pivot_row = (col..N).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        let pivot = a[pivot_row][col];
        if !pivot.is_finite() || pivot.abs() < f64::MIN_POSITIVE {
            return None;
        }
        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        for k in 0..N {
            a[col][k] /= pivot;
            inv[col][k] /= pivot;
        }
        for row in 0..N {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..N {
                a[row][k] -= factor * a[col][k];
                inv[row][k] -= factor * inv[col][k];
            }
        }
    }

    inv.iter().flatten().all(|v| v.is_finite()).then_some(inv)
}

/// Eigen-decomposition of a symmetric matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricEigen {
    /// Eigenvalues, largest first.
    pub values: [f64; N],
    /// `vectors[k]` is the unit eigenvector for `values[k]`.
    pub vectors: Matrix,
}

/// Cyclic Jacobi eigen-decomposition of a symmetric matrix.
///
/// Each eigenvector's largest-magnitude component is made positive so the
/// result is unique for distinct eigenvalues.
#[must_use]
pub fn symmetric_eigen(m: &Matrix) -> SymmetricEigen {
    let mut a = *m;
    let mut v = identity();

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum();
    if scale > 0.0 {
        for _ in 0..MAX_JACOBI_SWEEPS {
            let off: f64 = (0..N)
                .flat_map(|p| ((p + 1)..N).map(move |q| (p, q)))
                .map(|(p, q)| a[p][q] * a[p][q])
                .sum();
            if off <= f64::EPSILON * f64::EPSILON * scale {
                break;
            }
            for p in 0..N - 1 {
                for q in (p + 1)..N {
                    if a[p][q] == 0.0 {
                        continue;
                    }
                    let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                    let c = 1.0 / (t * t + 1.0).sqrt();
                    let s = t * c;

                    for k in 0..N {
                        let (akp, akq) = (a[k][p], a[k][q]);
                        a[k][p] = c * akp - s * akq;
                        a[k][q] = s * akp + c * akq;
                    }
                    for k in 0..N {
                        let (apk, aqk) = (a[p][k], a[q][k]);
                        a[p][k] = c * apk - s * aqk;
                        a[q][k] = s * apk + c * aqk;
                    }
                    a[p][q] = 0.0;
                    a[q][p] = 0.0;
                    for k in 0..N {
                        let (vkp, vkq) = (v[k][p], v[k][q]);
                        v[k][p] = c * vkp - s * vkq;
                        v[k][q] = s * vkp + c * vkq;
                    }
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..N).collect();
    order.sort_by(|&x, &y| a[y][y].total_cmp(&a[x][x]));

    let mut values = [0.0; N];
    let mut vectors = [[0.0; N]; N];
    for (k, &col) in order.iter().enumerate() {
        values[k] = a[col][col];
        let mut vector = [0.0; N];
        for i in 0..N {
            vector[i] = v[i][col];
        }
        let dominant = vector
            .iter()
            .copied()
            .max_by(|x, y| x.abs().total_cmp(&y.abs()))
            .unwrap_or(0.0);
        if dominant < 0.0 {
            vector.iter_mut().for_each(|x| *x = -*x);
        }
        vectors[k] = vector;
    }

    SymmetricEigen { values, vectors }
}

/// Moore–Penrose pseudo-inverse of a symmetric matrix.
///
/// Eigenvalues below `max|λ| · N · ε` are treated as zero.
#[must_use]
pub fn pseudo_inverse(m: &Matrix) -> Matrix {
    let eigen = symmetric_eigen(m);
    let largest = eigen.values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let cutoff = largest * N as f64 * f64::EPSILON;

    let mut out = [[0.0; N]; N];
    for (value, vector) in eigen.values.iter().zip(eigen.vectors.iter()) {
        if value.abs() <= cutoff {
            continue;
        }
        for i in 0..N {
            for j in 0..N {
                out[i][j] += vector[i] * vector[j] / value;
            }
        }
    }
    out
}

/// Mahalanobis distance of `x` from `mean` under `inverse_covariance`.
///
/// A quadratic form that rounds slightly negative is clamped to zero; one
/// that overflows is an infinite distance.
#[must_use]
pub fn mahalanobis(x: &FeatureVector, mean: &FeatureVector, inverse_covariance: &Matrix) -> f64 {
    let mut delta = [0.0; N];
    for i in 0..N {
        delta[i] = x.as_array()[i] - mean.as_array()[i];
    }
    let mut q = 0.0;
    for i in 0..N {
        for j in 0..N {
            q += delta[i] * inverse_covariance[i][j] * delta[j];
        }
    }
    if !q.is_finite() {
        return f64::INFINITY;
    }
    q.max(0.0).sqrt()
}

/// `m · x`.
#[must_use]
pub fn mat_vec(m: &Matrix, x: &[f64; N]) -> [f64; N] {
    let mut out = [0.0; N];
    for i in 0..N {
        out[i] = m[i].iter().zip(x.iter()).map(|(a, b)| a * b).sum();
    }
    out
}
