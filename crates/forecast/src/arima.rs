use crate::error::ForecastError;
use crate::optimizer::NelderMead;
use crate::transform::{
    constrain_invertible, constrain_stationary, is_invertible, is_stationary,
    unconstrain_invertible, unconstrain_stationary,
};
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};

pub const AR_ORDER: usize = 2;
pub const DIFF_ORDER: usize = 1;
pub const MA_ORDER: usize = 2;

/// Shortest price history the model is fitted on.
pub const MIN_OBSERVATIONS: usize = AR_ORDER + DIFF_ORDER + MA_ORDER + 10;

/// Two-sided coverage of the forecast bounds.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Longest autoregression used for the Hannan-Rissanen residual proxy.
const MAX_LONG_AR_ORDER: usize = 10;

/// One step of a fitted model's forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastStep {
    pub price: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
}

/// An ARIMA(2,1,2) model fitted to a price history.
///
/// The differenced prices `x_t = p_t - p_{t-1}` follow
/// `x_t = φ_1 x_{t-1} + φ_2 x_{t-2} + e_t + θ_1 e_{t-1} + θ_2 e_{t-2}`
/// with Gaussian innovations `e_t`. Parameters maximize the conditional
/// likelihood (conditional sum of squares), searched with Nelder-Mead over a
/// reparameterization that keeps every candidate stationary and invertible.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedArima {
    ar: [f64; AR_ORDER],
    ma: [f64; MA_ORDER],
    sigma2: f64,
    log_likelihood: f64,
    iterations: usize,
    last_price: f64,
    differences: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedArima {
    /// Fits the model to `prices`, oldest first.
    ///
    /// # Errors
    ///
    /// * `InsufficientData` when there are fewer than [`MIN_OBSERVATIONS`]
    ///   prices or the differenced series is constant.
    /// * `InvalidParameter` when a price is not finite.
    /// * `ModelFit` when the optimizer does not converge or the fitted
    ///   variance is not a positive finite number.
    pub fn fit(prices: &[f64]) -> Result<Self, ForecastError> {
        Self::fit_with(prices, &NelderMead::default())
    }

    /// [`FittedArima::fit`] with an explicit optimizer configuration.
    pub(crate) fn fit_with(prices: &[f64], optimizer: &NelderMead) -> Result<Self, ForecastError> {
        if prices.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: prices.len(),
                reason: "too few observations for ARIMA(2,1,2)".to_string(),
            });
        }
        if let Some(i) = prices.iter().position(|p| !p.is_finite()) {
            return Err(ForecastError::InvalidParameter {
                name: "prices".to_string(),
                reason: format!("value at index {} is not finite", i),
            });
        }

        let differences: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        if differences.windows(2).all(|w| w[0] == w[1]) {
            return Err(ForecastError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: prices.len(),
                reason: "price changes are constant, the series is degenerate".to_string(),
            });
        }

        let start = starting_values(&differences);
        let n_eff = (differences.len() - AR_ORDER) as f64;
        let objective = |u: &[f64]| {
            let (ar, ma) = from_unconstrained(u);
            let (sse, _) = conditional_residuals(&differences, &ar, &ma);
            0.5 * n_eff * (sse / n_eff).ln()
        };

        let minimum = optimizer.minimize(objective, &start);
        if !minimum.converged {
            return Err(ForecastError::ModelFit(format!(
                "optimizer did not converge after {} iterations",
                minimum.iterations
            )));
        }
        if !minimum.value.is_finite() {
            return Err(ForecastError::ModelFit(
                "likelihood is not finite at the optimum".to_string(),
            ));
        }

        let (ar, ma) = from_unconstrained(&minimum.point);
        let (sse, residuals) = conditional_residuals(&differences, &ar, &ma);
        let sigma2 = sse / n_eff;
        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(ForecastError::ModelFit(format!(
                "fitted innovation variance {} is not positive",
                sigma2
            )));
        }
        let log_likelihood =
            -0.5 * n_eff * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);

        tracing::debug!(
            ?ar,
            ?ma,
            sigma2,
            iterations = minimum.iterations,
            "fitted ARIMA(2,1,2)"
        );

        Ok(Self {
            ar,
            ma,
            sigma2,
            log_likelihood,
            iterations: minimum.iterations,
            last_price: prices[prices.len() - 1],
            differences,
            residuals,
        })
    }

    /// Autoregressive coefficients `[φ_1, φ_2]`.
    pub fn ar(&self) -> [f64; AR_ORDER] {
        self.ar
    }

    /// Moving-average coefficients `[θ_1, θ_2]`.
    pub fn ma(&self) -> [f64; MA_ORDER] {
        self.ma
    }

    /// Innovation variance.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion, counting the variance as a parameter.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * (AR_ORDER + MA_ORDER + 1) as f64
    }

    /// Simplex iterations the fit took.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Forecasts `horizon` steps past the last price.
    ///
    /// Future innovations are set to zero for the point path. The standard
    /// error at step `h` is `σ * sqrt(Σ_{j<h} ψ_j²)` where `ψ` are the
    /// moving-average weights of the integrated model.
    pub fn forecast(&self, horizon: usize) -> Result<Vec<ForecastStep>, ForecastError> {
        let z = critical_value(CONFIDENCE_LEVEL)?;

        let mut x = self.differences.clone();
        let mut e = self.residuals.clone();
        let mut price = self.last_price;
        let psi = self.psi_weights(horizon);

        let mut variance = 0.0;
        let mut steps = Vec::with_capacity(horizon);
        for weight in psi {
            let t = x.len();
            let next = (0..AR_ORDER).map(|i| self.ar[i] * x[t - 1 - i]).sum::<f64>()
                + (0..MA_ORDER).map(|j| self.ma[j] * e[t - 1 - j]).sum::<f64>();
            x.push(next);
            e.push(0.0);
            price += next;

            variance += self.sigma2 * weight * weight;
            let std_error = variance.sqrt();
            steps.push(ForecastStep {
                price,
                std_error,
                lower: price - z * std_error,
                upper: price + z * std_error,
            });
        }
        Ok(steps)
    }

    /// `ψ_0 .. ψ_{horizon-1}` of `(1 - φ(B))(1 - B) p_t = θ(B) e_t`.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let [phi1, phi2] = self.ar;
        let integrated = [1.0 + phi1, phi2 - phi1, -phi2];

        let mut psi: Vec<f64> = Vec::with_capacity(horizon);
        for j in 0..horizon {
            let mut weight = match j {
                0 => 1.0,
                j if j <= MA_ORDER => self.ma[j - 1],
                _ => 0.0,
            };
            for (i, a) in integrated.iter().enumerate().take(j) {
                weight += a * psi[j - 1 - i];
            }
            psi.push(weight);
        }
        psi
    }

    #[cfg(test)]
    fn with_parameters(
        prices: &[f64],
        ar: [f64; AR_ORDER],
        ma: [f64; MA_ORDER],
        sigma2: f64,
    ) -> Self {
        let differences: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let (_, residuals) = conditional_residuals(&differences, &ar, &ma);
        Self {
            ar,
            ma,
            sigma2,
            log_likelihood: 0.0,
            iterations: 0,
            last_price: prices[prices.len() - 1],
            differences,
            residuals,
        }
    }
}

fn from_unconstrained(u: &[f64]) -> ([f64; AR_ORDER], [f64; MA_ORDER]) {
    let ar = constrain_stationary(&u[..AR_ORDER]);
    let ma = constrain_invertible(&u[AR_ORDER..]);
    ([ar[0], ar[1]], [ma[0], ma[1]])
}

/// Conditional one-step residuals, starting at `t = AR_ORDER` with earlier
/// residuals taken as zero. Returns the sum of squares and the residuals.
fn conditional_residuals(
    x: &[f64],
    ar: &[f64; AR_ORDER],
    ma: &[f64; MA_ORDER],
) -> (f64, Vec<f64>) {
    let mut e = vec![0.0; x.len()];
    let mut sse = 0.0;
    for t in AR_ORDER..x.len() {
        let mut predicted = 0.0;
        for i in 0..AR_ORDER {
            predicted += ar[i] * x[t - 1 - i];
        }
        for j in 0..MA_ORDER {
            predicted += ma[j] * e[t - 1 - j];
        }
        e[t] = x[t] - predicted;
        sse += e[t] * e[t];
    }
    (sse, e)
}

/// Unconstrained starting point for the optimizer.
///
/// Uses Hannan-Rissanen estimates when they are stationary and invertible,
/// zeros otherwise.
fn starting_values(x: &[f64]) -> Vec<f64> {
    let zeros = vec![0.0; AR_ORDER + MA_ORDER];
    let Some((ar, ma)) = hannan_rissanen(x) else {
        tracing::warn!("starting regression is singular, starting from zero coefficients");
        return zeros;
    };
    if !is_stationary(&ar) || !is_invertible(&ma) {
        tracing::warn!(?ar, ?ma, "starting values outside the admissible region, using zeros");
        return zeros;
    }
    match (unconstrain_stationary(&ar), unconstrain_invertible(&ma)) {
        (Some(mut start), Some(ma_start)) => {
            start.extend(ma_start);
            start
        }
        _ => zeros,
    }
}

/// Two-stage regression: a long autoregression supplies residual proxies,
/// then `x_t` is regressed on its own lags and the lagged proxies.
fn hannan_rissanen(x: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
    let m = x.len();
    let k = (m / 3).clamp(AR_ORDER.max(MA_ORDER), MAX_LONG_AR_ORDER);

    let long_ar = least_squares(
        (k..m).map(|t| (1..=k).map(|i| x[t - i]).collect()),
        (k..m).map(|t| x[t]),
        k,
    )?;
    let mut proxy = vec![0.0; m];
    for t in k..m {
        proxy[t] = x[t] - (1..=k).map(|i| long_ar[i - 1] * x[t - i]).sum::<f64>();
    }

    let first = k + MA_ORDER;
    if m < first + AR_ORDER + MA_ORDER + 1 {
        return None;
    }
    let beta = least_squares(
        (first..m).map(|t| {
            (1..=AR_ORDER)
                .map(|i| x[t - i])
                .chain((1..=MA_ORDER).map(|j| proxy[t - j]))
                .collect()
        }),
        (first..m).map(|t| x[t]),
        AR_ORDER + MA_ORDER,
    )?;

    Some((
        beta.iter().take(AR_ORDER).copied().collect(),
        beta.iter().skip(AR_ORDER).copied().collect(),
    ))
}

/// Ordinary least squares by the normal equations. `None` when `X'X` is
/// singular or the solution is not finite.
fn least_squares(
    rows: impl Iterator<Item = Vec<f64>>,
    targets: impl Iterator<Item = f64>,
    columns: usize,
) -> Option<DVector<f64>> {
    let data: Vec<f64> = rows.flatten().collect();
    let y = DVector::from_iterator(data.len() / columns, targets);
    let x = DMatrix::from_row_slice(y.len(), columns, &data);

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y;
    let beta = xtx.try_inverse()? * xty;
    beta.iter().all(|b| b.is_finite()).then_some(beta)
}

fn critical_value(confidence: f64) -> Result<f64, ForecastError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::ModelFit(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + confidence / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn simulate(n: usize, ar: [f64; 2], ma: [f64; 2], scale: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, scale).unwrap();
        let e: Vec<f64> = (0..n + 2).map(|_| noise.sample(&mut rng)).collect();
        let mut x = vec![0.0; n + 2];
        for t in 2..n + 2 {
            x[t] = ar[0] * x[t - 1] + ar[1] * x[t - 2] + e[t] + ma[0] * e[t - 1] + ma[1] * e[t - 2];
        }
        let mut price = 1_000.0;
        std::iter::once(price)
            .chain(x[2..].iter().map(|d| {
                price += d;
                price
            }))
            .collect()
    }

    #[test]
    fn recovers_the_innovation_variance() {
        let prices = simulate(1_000, [0.5, -0.2], [0.3, 0.1], 2.0, 7);
        let model = FittedArima::fit(&prices).unwrap();
        assert_relative_eq!(model.sigma2(), 4.0, max_relative = 0.15);
        assert!(is_stationary(&model.ar()));
        assert!(is_invertible(&model.ma()));
        assert!(model.aic() > -2.0 * model.log_likelihood());
    }

    #[test]
    fn fit_is_deterministic() {
        let prices = simulate(120, [0.2, 0.1], [-0.3, 0.0], 5.0, 11);
        let a = FittedArima::fit(&prices).unwrap();
        let b = FittedArima::fit(&prices).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn exhausted_optimizer_is_a_model_fit_error() {
        let prices = simulate(200, [0.4, 0.1], [0.2, 0.0], 3.0, 19);
        let optimizer = NelderMead {
            max_iterations: 1,
            ..NelderMead::default()
        };
        let err = FittedArima::fit_with(&prices, &optimizer).unwrap_err();
        assert!(err.is_model_fit());
        assert!(!err.is_insufficient_data());
        assert!(matches!(err, ForecastError::ModelFit(_)));
    }

    #[test]
    fn rejects_short_history() {
        let err = FittedArima::fit(&[100.0; MIN_OBSERVATIONS - 1]).unwrap_err();
        assert!(err.is_insufficient_data());
        assert!(matches!(
            err,
            ForecastError::InsufficientData { required: MIN_OBSERVATIONS, actual: 14, .. }
        ));
    }

    #[test]
    fn rejects_constant_and_linear_prices() {
        assert!(FittedArima::fit(&[250.0; 40]).unwrap_err().is_insufficient_data());
        let linear: Vec<f64> = (0..40).map(|i| 100.0 + 3.0 * i as f64).collect();
        assert!(FittedArima::fit(&linear).unwrap_err().is_insufficient_data());
    }

    #[test]
    fn rejects_non_finite_prices() {
        let mut prices = simulate(30, [0.0, 0.0], [0.0, 0.0], 1.0, 3);
        prices[10] = f64::NAN;
        assert!(matches!(
            FittedArima::fit(&prices),
            Err(ForecastError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn random_walk_forecast_is_flat_with_growing_variance() {
        let prices = simulate(30, [0.0, 0.0], [0.0, 0.0], 1.0, 5);
        let model = FittedArima::with_parameters(&prices, [0.0, 0.0], [0.0, 0.0], 4.0);
        let steps = model.forecast(5).unwrap();
        let last = *prices.last().unwrap();
        for (h, step) in steps.iter().enumerate() {
            assert_eq!(step.price, last);
            assert_relative_eq!(step.std_error, (4.0 * (h + 1) as f64).sqrt(), epsilon = 1e-12);
        }
        assert_relative_eq!(steps[0].upper - steps[0].price, 1.959963984540054 * 2.0, epsilon = 1e-6);
    }

    #[test]
    fn psi_weights_follow_the_integrated_recursion() {
        let prices = simulate(30, [0.0, 0.0], [0.0, 0.0], 1.0, 9);
        let model = FittedArima::with_parameters(&prices, [0.5, 0.0], [0.4, 0.0], 1.0);
        let psi = model.psi_weights(4);
        // a = [1.5, -0.5, 0]; ψ1 = 0.4 + 1.5, ψ2 = 1.5ψ1 - 0.5, ψ3 = 1.5ψ2 - 0.5ψ1.
        assert_abs_diff_eq!(psi[0], 1.0);
        assert_abs_diff_eq!(psi[1], 1.9, epsilon = 1e-12);
        assert_abs_diff_eq!(psi[2], 2.35, epsilon = 1e-12);
        assert_abs_diff_eq!(psi[3], 2.575, epsilon = 1e-12);
    }

    #[test]
    fn first_step_error_is_sigma() {
        let prices = simulate(200, [0.4, 0.1], [0.2, 0.0], 3.0, 13);
        let model = FittedArima::fit(&prices).unwrap();
        let steps = model.forecast(10).unwrap();
        assert_relative_eq!(steps[0].std_error, model.sigma2().sqrt(), epsilon = 1e-12);
        for pair in steps.windows(2) {
            assert!(pair[1].std_error >= pair[0].std_error);
        }
        for step in &steps {
            assert!(step.lower <= step.price && step.price <= step.upper);
        }
    }

    #[test]
    fn zero_coefficients_leave_differences_as_residuals() {
        let x = [1.0, -2.0, 0.5, 3.0];
        let (sse, e) = conditional_residuals(&x, &[0.0, 0.0], &[0.0, 0.0]);
        assert_eq!(e, vec![0.0, 0.0, 0.5, 3.0]);
        assert_eq!(sse, 9.25);
    }

    #[test]
    fn hannan_rissanen_finds_ar_structure() {
        let prices = simulate(2_000, [0.6, 0.0], [0.0, 0.0], 1.0, 17);
        let x: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let (ar, _) = hannan_rissanen(&x).unwrap();
        assert_abs_diff_eq!(ar[0], 0.6, epsilon = 0.1);
    }
}
