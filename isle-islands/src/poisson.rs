//! Poisson probabilities for window scores and enrichment tests.
//!
//! The probability mass is evaluated by exact factorials for small counts and in log
//! space, with Ramanujan's log-factorial approximation, from [`EXACT_FACTORIAL_LIMIT`]
//! upwards so that large counts neither overflow nor underflow before the final
//! exponentiation. Tail probabilities come from the regularized incomplete gamma
//! function, which keeps tiny p-values accurate instead of computing `1 - cdf`.

use std::f64::consts::PI;

use statrs::function::gamma::gamma_lr;

/// Counts below this use exact factorials.
pub const EXACT_FACTORIAL_LIMIT: u64 = 20;

///
/// `m!` by direct multiplication. Only meant for small `m`.
///
pub fn factorial(m: u64) -> f64 {
    (2..=m).fold(1.0, |acc, i| acc * i as f64)
}

///
/// `ln(m!)`, exact below [`EXACT_FACTORIAL_LIMIT`], Ramanujan's approximation above.
///
pub fn ln_factorial(m: u64) -> f64 {
    if m < EXACT_FACTORIAL_LIMIT {
        factorial(m).ln()
    } else {
        let m = m as f64;
        m * m.ln() - m + (m * (1.0 + 4.0 * m * (1.0 + 2.0 * m))).ln() / 6.0 + PI.ln() / 2.0
    }
}

///
/// P(X = k) for X ~ Poisson(lambda).
///
pub fn poisson_pmf(k: u64, lambda: f64) -> f64 {
    if k < EXACT_FACTORIAL_LIMIT {
        (-lambda).exp() * lambda.powi(k as i32) / factorial(k)
    } else {
        let exponent = -lambda + k as f64 * lambda.ln() - ln_factorial(k);
        exponent.exp()
    }
}

///
/// Survival function P(X > k) for X ~ Poisson(lambda).
///
/// Uses P(X > k) = P(k + 1, lambda), the regularized lower incomplete gamma
/// function, which is evaluated by its series exactly where the tail is small.
///
pub fn poisson_sf(k: u64, lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 0.0;
    }
    gamma_lr(k as f64 + 1.0, lambda).clamp(0.0, 1.0)
}

///
/// Upper tail P(X >= k) for X ~ Poisson(lambda).
///
pub fn poisson_upper_tail(k: u64, lambda: f64) -> f64 {
    match k {
        0 => 1.0,
        k => poisson_sf(k - 1, lambda),
    }
}

///
/// One-sided enrichment p-value of observing `observed` where `expected` was expected.
///
/// Depletion is never tested: the p-value is exactly 1 whenever the observation does
/// not exceed the expectation. Otherwise it is the survival function at `observed`.
///
pub fn enrichment_pvalue(observed: u32, expected: f64) -> f64 {
    if observed as f64 <= expected {
        1.0
    } else {
        poisson_sf(observed as u64, expected)
    }
}
