// =============================================================================
// Sliding-window accumulators
// =============================================================================
//
// Every rolling indicator is built on `RollingWindow`, a fixed-capacity ring
// buffer over the trailing `w` values. Windows are causal: the value emitted
// at position i depends only on cells [i-w+1, i].
//
// Absent cells are never fed into arithmetic. A window that would contain an
// absent cell is itself absent, so a statistic needs `w` consecutive present
// values before it is defined.

use std::collections::VecDeque;
use ta::Next;
use ta::indicators::ExponentialMovingAverage;

/// Fixed-capacity trailing window of observations.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    /// Length of the run of identical values ending at the newest element.
    same_run: usize,
}

impl RollingWindow {
    /// `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            values: VecDeque::with_capacity(capacity.max(1)),
            same_run: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.same_run = match self.values.back() {
            Some(&last) if last == value => self.same_run + 1,
            _ => 1,
        };
        self.values.push_back(value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.same_run = 0;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Sample standard deviation (ddof = 1) of the buffered values.
    ///
    /// Exactly `0.0` when every buffered value is identical; `None` with
    /// fewer than two values.
    pub fn sample_std(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        if self.same_run >= n {
            return Some(0.0);
        }
        let mean = self.mean()?;
        let ss: f64 = self.values.iter().map(|x| (x - mean).powi(2)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    }
}

/// Runs `stat` over a trailing window of width `window`, emitting `None`
/// until the window holds `window` consecutive present values.
fn rolling<I, F>(values: I, window: usize, stat: F) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = Option<f64>>,
    F: Fn(&RollingWindow) -> Option<f64>,
{
    let mut acc = RollingWindow::new(window);
    values
        .into_iter()
        .map(|cell| match cell {
            Some(v) => {
                acc.push(v);
                if acc.is_full() { stat(&acc) } else { None }
            }
            None => {
                acc.clear();
                None
            }
        })
        .collect()
}

/// Simple trailing mean over `window` cells.
pub fn rolling_mean<I>(values: I, window: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = Option<f64>>,
{
    rolling(values, window, RollingWindow::mean)
}

/// Trailing sample standard deviation over `window` cells.
pub fn rolling_std<I>(values: I, window: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = Option<f64>>,
{
    rolling(values, window, RollingWindow::sample_std)
}

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first value
/// and without bias adjustment. Defined from the first observation onward.
///
/// Returns an empty vector when `span` is zero.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let Ok(mut indicator) = ExponentialMovingAverage::new(span) else {
        return Vec::new();
    };
    values.iter().map(|&v| indicator.next(v)).collect()
}

/// Arithmetic mean of a slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1) of a slice, exactly zero when all
/// values are identical.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if values.windows(2).all(|w| w[0] == w[1]) {
        return Some(0.0);
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn present(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn window_evicts_oldest() {
        let mut w = RollingWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            w.push(v);
        }
        assert!(w.is_full());
        assert_eq!(w.len(), 3);
        assert_relative_eq!(w.mean().unwrap(), 3.0);
    }

    #[test]
    fn sample_std_matches_textbook() {
        // Sample std of 2,4,4,4,5,5,7,9 is sqrt(32/7).
        let mut w = RollingWindow::new(8);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            w.push(v);
        }
        assert_relative_eq!(w.sample_std().unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn constant_window_has_exactly_zero_std() {
        let mut w = RollingWindow::new(30);
        for _ in 0..45 {
            w.push(0.1);
        }
        assert_eq!(w.sample_std(), Some(0.0));

        // A run that no longer spans the whole window is not constant.
        w.push(0.2);
        assert!(w.sample_std().unwrap() > 0.0);
    }

    #[test]
    fn single_value_has_no_std() {
        let mut w = RollingWindow::new(1);
        w.push(5.0);
        assert_eq!(w.sample_std(), None);
    }

    #[test]
    fn rolling_mean_warm_up() {
        let out = rolling_mean(present(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn absent_cells_restart_the_window() {
        let input = vec![Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let out = rolling_mean(input, 2);
        assert_eq!(out, vec![None, Some(1.5), None, None, Some(3.5), Some(4.5)]);
    }

    #[test]
    fn ema_is_seeded_with_first_value() {
        let values = [10.0, 11.0, 12.0, 13.0];
        let out = ema(&values, 3);
        let alpha = 2.0 / 4.0;
        let mut expected = 10.0;
        assert_relative_eq!(out[0], expected);
        for (i, &v) in values.iter().enumerate().skip(1) {
            expected = alpha * v + (1.0 - alpha) * expected;
            assert_relative_eq!(out[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn ema_zero_span_is_empty() {
        assert!(ema(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn slice_std_of_identical_values_is_zero() {
        assert_eq!(sample_std(&[0.3, 0.3, 0.3]), Some(0.0));
        assert_eq!(sample_std(&[0.3]), None);
        assert_eq!(mean(&[]), None);
    }
}
