/// Derivative-free Nelder-Mead simplex minimizer.
///
/// The search is fully deterministic: the initial simplex is the starting
/// point plus one step along each axis.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMead {
    pub initial_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    /// Converged when `f_max - f_min <= tolerance * max(1, |f_min|)`.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            tolerance: 1e-10,
            max_iterations: 5000,
        }
    }
}

/// Best vertex found by a run of [`NelderMead::minimize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl NelderMead {
    /// Minimizes `objective` starting from `start`.
    ///
    /// Non-finite objective values are treated as `+inf`, so the simplex
    /// moves away from them.
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        let eval = |x: &[f64]| {
            let v = objective(x);
            if v.is_finite() { v } else { f64::INFINITY }
        };

        let n = start.len();
        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push((start.to_vec(), eval(start)));
        for i in 0..n {
            let mut vertex = start.to_vec();
            vertex[i] += self.initial_step;
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            let f_min = simplex[0].1;
            let f_max = simplex[n].1;
            if f_max - f_min <= self.tolerance * f_min.abs().max(1.0) {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(v, _)| v[j]).sum::<f64>() / n as f64)
                .collect();
            let toward = |from: &[f64], coef: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, x)| c + coef * (x - c))
                    .collect()
            };

            let worst = simplex[n].0.clone();
            let reflected = toward(&worst, -self.reflection);
            let f_reflected = eval(&reflected);

            if f_reflected < f_min {
                let expanded = toward(&worst, -self.reflection * self.expansion);
                let f_expanded = eval(&expanded);
                simplex[n] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }
            if f_reflected < simplex[n - 1].1 {
                simplex[n] = (reflected, f_reflected);
                continue;
            }

            // Outside contraction when the reflection beat the worst vertex,
            // inside contraction otherwise.
            let (contracted, bound) = if f_reflected < f_max {
                (toward(&worst, -self.reflection * self.contraction), f_reflected)
            } else {
                (toward(&worst, self.contraction), f_max)
            };
            let f_contracted = eval(&contracted);
            if f_contracted < bound {
                simplex[n] = (contracted, f_contracted);
                continue;
            }

            let best = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let shrunk: Vec<f64> = best
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, x)| b + self.shrink * (x - b))
                    .collect();
                let value = eval(&shrunk);
                *vertex = (shrunk, value);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = simplex.swap_remove(0);
        tracing::debug!(iterations, converged, value, "nelder-mead finished");
        Minimum {
            point,
            value,
            iterations,
            converged,
        }
    }
}
