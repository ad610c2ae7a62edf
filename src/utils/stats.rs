//! Bounded sample windows for in-process quantile estimation

use std::collections::VecDeque;

/// Maximum number of samples a summary window retains
pub const MAX_SUMMARY_SAMPLES: usize = 10_000;

/// Helper trait for bounded VecDeque operations
pub trait BoundedPush<T> {
    fn push_bounded(&mut self, value: T, max_size: usize);
}

impl<T> BoundedPush<T> for VecDeque<T> {
    /// Push a value while maintaining a maximum size (O(1) amortized)
    #[inline]
    fn push_bounded(&mut self, value: T, max_size: usize) {
        if self.len() >= max_size {
            self.pop_front();
        }
        self.push_back(value);
    }
}

/// Calculate a quantile from sorted values with linear interpolation
pub fn calculate_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    if percentile >= 1.0 {
        return sorted_values.last().copied().unwrap_or(0.0);
    }
    if percentile <= 0.0 {
        return sorted_values[0];
    }

    let index = percentile * (sorted_values.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = (index.ceil() as usize).min(sorted_values.len() - 1);

    if lower == upper {
        sorted_values.get(lower).copied().unwrap_or(0.0)
    } else {
        let weight = index - lower as f64;
        let lower_val = sorted_values.get(lower).copied().unwrap_or(0.0);
        let upper_val = sorted_values.get(upper).copied().unwrap_or(0.0);
        lower_val * (1.0 - weight) + upper_val * weight
    }
}

/// A sliding window of observations answering quantile queries
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(MAX_SUMMARY_SAMPLES)
    }
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.samples.push_bounded(value, self.capacity);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retained samples, oldest first
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Quantile over the retained samples, 0 when empty
    pub fn quantile(&self, q: f64) -> f64 {
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        calculate_percentile(&sorted, q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(calculate_percentile(&values, 0.5), 3.0);
        assert_eq!(calculate_percentile(&values, 0.95), 4.8);
        assert_eq!(calculate_percentile(&values, 1.0), 5.0);
        assert_eq!(calculate_percentile(&values, 0.0), 1.0);
        assert_eq!(calculate_percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut window = SampleWindow::new(3);
        for v in [10.0, 1.0, 2.0, 3.0] {
            window.push(v);
        }
        assert_eq!(window.len(), 3);
        // 10.0 fell out of the window
        assert_eq!(window.quantile(1.0), 3.0);
    }

    #[test]
    fn test_window_sorts_before_querying() {
        let mut window = SampleWindow::default();
        for v in [5.0, 1.0, 4.0, 2.0, 3.0] {
            window.push(v);
        }
        assert_eq!(window.quantile(0.5), 3.0);
        assert!(SampleWindow::default().is_empty());
    }
}
