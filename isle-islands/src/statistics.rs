//! Correlation between two libraries' island counts.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::fdr::rank_average;

///
/// A correlation coefficient with its two-sided p-value.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
}

///
/// Pearson correlation of `x` and `y`.
///
/// Returns `None` when there are fewer than three pairs or either side is constant.
/// The p-value tests against zero correlation with a Student's t statistic on
/// `n - 2` degrees of freedom.
///
pub fn pearson(x: &[f64], y: &[f64]) -> Option<Correlation> {
    let n = x.len().min(y.len());
    if n < 3 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }
    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }

    let coefficient = (covariance / (variance_x * variance_y).sqrt()).clamp(-1.0, 1.0);
    Some(Correlation {
        coefficient,
        p_value: correlation_pvalue(coefficient, n),
    })
}

///
/// Spearman rank correlation: Pearson correlation of the average ranks.
///
pub fn spearman(x: &[f64], y: &[f64]) -> Option<Correlation> {
    let n = x.len().min(y.len());
    pearson(&rank_average(&x[..n]), &rank_average(&y[..n]))
}

fn correlation_pvalue(coefficient: f64, n: usize) -> f64 {
    let freedom = (n - 2) as f64;
    let remainder = 1.0 - coefficient * coefficient;
    if remainder <= 0.0 {
        return 0.0;
    }
    let t = coefficient * (freedom / remainder).sqrt();
    match StudentsT::new(0.0, 1.0, freedom) {
        Ok(distribution) => (2.0 * distribution.sf(t.abs())).min(1.0),
        Err(_) => 1.0,
    }
}
