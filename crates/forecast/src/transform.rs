//! Reparameterization that keeps lag polynomials stationary.
//!
//! Any real vector maps to the coefficients of a stationary autoregressive
//! polynomial: each coordinate is squashed into a partial autocorrelation in
//! (-1, 1) and the Durbin-Levinson recursion builds the coefficients from
//! those. The optimizer therefore searches an unbounded space while every
//! candidate it evaluates is a valid model.

/// Maps unconstrained values to stationary AR coefficients
/// (`x_t = φ_1 x_{t-1} + ... + φ_n x_{t-n} + e_t`).
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let n = unconstrained.len();
    if n == 0 {
        return Vec::new();
    }
    let partial: Vec<f64> = unconstrained
        .iter()
        .map(|x| x / (1.0 + x * x).sqrt())
        .collect();

    let mut y = vec![vec![0.0; n]; n];
    for k in 0..n {
        for i in 0..k {
            y[k][i] = y[k - 1][i] + partial[k] * y[k - 1][k - i - 1];
        }
        y[k][k] = partial[k];
    }
    y[n - 1].iter().map(|v| -v).collect()
}

/// Inverse of [`constrain_stationary`].
///
/// Returns `None` when the coefficients are not strictly stationary.
pub fn unconstrain_stationary(constrained: &[f64]) -> Option<Vec<f64>> {
    let n = constrained.len();
    if n == 0 {
        return Some(Vec::new());
    }

    let mut y = vec![vec![0.0; n]; n];
    y[n - 1] = constrained.iter().map(|v| -v).collect();
    for k in (1..n).rev() {
        let r = y[k][k];
        let denom = 1.0 - r * r;
        if !denom.is_finite() || denom <= 0.0 {
            return None;
        }
        for i in 0..k {
            y[k - 1][i] = (y[k][i] - r * y[k][k - i - 1]) / denom;
        }
    }

    (0..n)
        .map(|k| {
            let r = y[k][k];
            let denom = 1.0 - r * r;
            (denom > 0.0 && r.is_finite()).then(|| r / denom.sqrt())
        })
        .collect()
}

/// Maps unconstrained values to invertible MA coefficients
/// (`x_t = e_t + θ_1 e_{t-1} + ... + θ_n e_{t-n}`).
pub fn constrain_invertible(unconstrained: &[f64]) -> Vec<f64> {
    constrain_stationary(unconstrained)
        .into_iter()
        .map(|v| -v)
        .collect()
}

/// Inverse of [`constrain_invertible`]; `None` when not strictly invertible.
pub fn unconstrain_invertible(constrained: &[f64]) -> Option<Vec<f64>> {
    let negated: Vec<f64> = constrained.iter().map(|v| -v).collect();
    unconstrain_stationary(&negated)
}

/// Checks the AR(2) stationarity triangle. Orders other than 2 go through
/// the partial autocorrelation recursion.
pub fn is_stationary(ar: &[f64]) -> bool {
    match ar {
        [phi1, phi2] => phi2.abs() < 1.0 && phi1 + phi2 < 1.0 && phi2 - phi1 < 1.0,
        _ => unconstrain_stationary(ar).is_some(),
    }
}

pub fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|v| -v).collect();
    is_stationary(&negated)
}
