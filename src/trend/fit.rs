//! Least-squares fit across the five named model families.
//!
//! Every family is fit by transforming to a linear form, solving the
//! closed-form ordinary-least-squares normal equations, then scoring the
//! untransformed prediction against the real series so families are
//! compared on the same footing regardless of which one linearizes.

use crate::trend::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Degree-`d` polynomial, `d` taken from configuration (degree 1 is a
    /// plain line).
    Polynomial(usize),
    Logarithmic,
    Power,
    Exponential,
    NLogN,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Polynomial(1) => write!(f, "linear"),
            ModelKind::Polynomial(d) => write!(f, "polynomial (degree {d})"),
            ModelKind::Logarithmic => write!(f, "logarithmic"),
            ModelKind::Power => write!(f, "power"),
            ModelKind::Exponential => write!(f, "exponential"),
            ModelKind::NLogN => write!(f, "n log n"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub kind: ModelKind,
    /// Coefficients in whatever space `kind` linearizes in, lowest-order
    /// first; [`Model::predict`] applies the family's own inverse
    /// transform. Two-parameter families (`a`, `b`) use indices 0 and 1;
    /// [`ModelKind::Polynomial`] uses one entry per degree, `coefficients[i]`
    /// multiplying `n^i`.
    pub coefficients: Vec<f64>,
    pub rss: f64,
}

impl Model {
    pub fn predict(&self, n: u64) -> f64 {
        let x = n as f64;
        match self.kind {
            ModelKind::Polynomial(_) => self
                .coefficients
                .iter()
                .rev()
                .fold(0.0, |acc, &c| acc * x + c),
            ModelKind::Logarithmic => self.coefficients[0] + self.coefficients[1] * x.max(1.0).ln(),
            ModelKind::Power => self.coefficients[0] * x.max(1.0).powf(self.coefficients[1]),
            ModelKind::Exponential => self.coefficients[0] * self.coefficients[1].powf(x),
            ModelKind::NLogN => self.coefficients[0] * nlogn(x) + self.coefficients[1],
        }
    }
}

fn nlogn(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        x * x.ln()
    }
}

/// Ordinary least squares for `y = a + b * x` given paired samples.
/// Returns `None` if fewer than two distinct `x` values are present.
fn ols(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len() as f64;
    if xs.len() < 2 {
        return None;
    }
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let b = (n * sum_xy - sum_x * sum_y) / denom;
    let a = (sum_y - b * sum_x) / n;
    Some((a, b))
}

/// Solves `a * x = b` in place via Gaussian elimination with partial
/// pivoting. Returns `None` for a singular (or near-singular) system.
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().partial_cmp(&a[j][col].abs()).unwrap())?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let sum: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - sum) / a[row][row];
    }
    Some(x)
}

/// Least-squares fit of `y = c0 + c1*x + ... + cd*x^d` via the normal
/// equations over a Vandermonde basis. Returns `None` when there are fewer
/// distinct samples than coefficients to fit.
fn polynomial_ols(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    let terms = degree + 1;
    if xs.len() < terms {
        return None;
    }
    let powers: Vec<Vec<f64>> = xs
        .iter()
        .map(|&x| (0..terms).map(|p| x.powi(p as i32)).collect())
        .collect();

    let mut a = vec![vec![0.0; terms]; terms];
    let mut b = vec![0.0; terms];
    for i in 0..terms {
        for j in 0..terms {
            a[i][j] = powers.iter().map(|row| row[i] * row[j]).sum();
        }
        b[i] = powers.iter().zip(ys).map(|(row, &y)| row[i] * y).sum();
    }
    solve_linear_system(a, b)
}

fn rss(series: &Series, model_kind: ModelKind, coefficients: Vec<f64>) -> f64 {
    let model = Model {
        kind: model_kind,
        coefficients,
        rss: 0.0,
    };
    series
        .points()
        .map(|&(n, wc)| (wc - model.predict(n)).powi(2))
        .sum()
}

fn try_fit_polynomial(series: &Series, degree: usize) -> Option<Model> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = series.points().map(|&(n, wc)| (n as f64, wc)).unzip();
    let coefficients = polynomial_ols(&xs, &ys, degree)?;
    let rss = rss(series, ModelKind::Polynomial(degree), coefficients.clone());
    Some(Model {
        kind: ModelKind::Polynomial(degree),
        coefficients,
        rss,
    })
}

fn try_fit_two_param(
    series: &Series,
    kind: ModelKind,
    transform: impl Fn(u64, f64) -> Option<(f64, f64)>,
) -> Option<Model> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = series
        .points()
        .filter_map(|&(n, wc)| transform(n, wc))
        .unzip();
    let (a, b) = ols(&xs, &ys)?;
    let coefficients = vec![a, b];
    let rss = rss(series, kind, coefficients.clone());
    Some(Model {
        kind,
        coefficients,
        rss,
    })
}

/// Fits every family whose domain the series satisfies and returns the one
/// with the lowest residual sum of squares. `None` for an empty series —
/// the Driver treats that as a warning, not an error. `polynomial_degree`
/// is the configured degree for the polynomial family (1 is a line).
pub fn fit_best(series: &Series, polynomial_degree: usize) -> Option<Model> {
    if series.is_empty() {
        return None;
    }

    let candidates = [
        try_fit_polynomial(series, polynomial_degree),
        try_fit_two_param(series, ModelKind::Logarithmic, |n, wc| {
            (n > 0).then(|| ((n as f64).ln(), wc))
        }),
        try_fit_two_param(series, ModelKind::Power, |n, wc| {
            (n > 0 && wc > 0.0).then(|| ((n as f64).ln(), wc.ln()))
        })
        .map(|m| Model {
            coefficients: vec![m.coefficients[0].exp(), m.coefficients[1]],
            ..m
        }),
        try_fit_two_param(series, ModelKind::Exponential, |n, wc| {
            (wc > 0.0).then(|| (n as f64, wc.ln()))
        })
        .map(|m| Model {
            coefficients: vec![m.coefficients[0].exp(), m.coefficients[1].exp()],
            ..m
        }),
        try_fit_two_param(series, ModelKind::NLogN, |n, wc| Some((nlogn(n as f64), wc))),
    ];

    // Power/Exponential coefficients are transformed after OLS but before
    // scoring, so their `rss` fields above were computed pre-transform;
    // recompute once more on the corrected coefficients.
    let rescored: Vec<Model> = candidates
        .into_iter()
        .flatten()
        .map(|m| {
            let corrected_rss = rss(series, m.kind, m.coefficients.clone());
            Model {
                rss: corrected_rss,
                ..m
            }
        })
        .collect();

    rescored
        .into_iter()
        .min_by(|a, b| a.rss.partial_cmp(&b.rss).unwrap_or(std::cmp::Ordering::Equal))
}
