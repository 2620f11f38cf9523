//! End-of-run statistics sink.
//!
//! Mutated only from the rack dispatcher's event loop, so no synchronization
//! is needed; the dispatcher hands the finished value back to the runtime.

use std::fmt::Display;

/// Accumulates terminal outcomes across a simulation run.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    delivered_values: Vec<f64>,
    wasted_values: Vec<f64>,
    spoiled: usize,
    expected: usize,
}

impl Stats {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            ..Self::default()
        }
    }

    /// Record a courier pickup at the given order value.
    pub fn delivered(&mut self, value: f64) {
        self.delivered_values.push(value);
    }

    /// Record an overflow eviction at the given order value.
    pub fn wasted(&mut self, value: f64) {
        self.wasted_values.push(value);
    }

    /// Record a spoilage.
    pub fn spoiled(&mut self) {
        self.spoiled += 1;
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered_values.len()
    }

    pub fn wasted_count(&self) -> usize {
        self.wasted_values.len()
    }

    pub fn spoiled_count(&self) -> usize {
        self.spoiled
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Total terminal outcomes recorded so far.
    pub fn processed(&self) -> usize {
        self.delivered_values.len() + self.wasted_values.len() + self.spoiled
    }

    /// Arithmetic mean of delivered values; zero when nothing was delivered.
    pub fn avg_delivered(&self) -> f64 {
        mean(&self.delivered_values)
    }

    /// Arithmetic mean of wasted values; zero when nothing was wasted.
    pub fn avg_wasted(&self) -> f64 {
        mean(&self.wasted_values)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Delivered {}/{}, avg value {:.6}; Wasted {}/{}, avg value {:.6}; Spoiled {}/{}",
            self.delivered_values.len(),
            self.expected,
            self.avg_delivered(),
            self.wasted_values.len(),
            self.expected,
            self.avg_wasted(),
            self.spoiled,
            self.expected,
        )
    }
}
