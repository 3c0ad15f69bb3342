//! Injectable randomness
//!
//! The scorer and the mock gateway draw their random values through this
//! trait so tests can pin the outcome.

use rand::Rng;
use std::sync::Mutex;

/// Source of uniform random values
pub trait RandomSource: Send + Sync {
    /// Next uniform value in [0, 1)
    fn next_f64(&self) -> f64;
}

/// Production source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Test source that always returns the same value
#[derive(Debug, Clone, Copy)]
pub struct FixedRandomSource(f64);

impl FixedRandomSource {
    /// Create a source pinned to `value`
    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl RandomSource for FixedRandomSource {
    fn next_f64(&self) -> f64 {
        self.0
    }
}

/// Test source that cycles through a fixed sequence of values
#[derive(Debug)]
pub struct SequenceRandomSource {
    values: Vec<f64>,
    next: Mutex<usize>,
}

impl SequenceRandomSource {
    /// Create a source that yields `values` in order, wrapping around
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sequence must not be empty");
        Self {
            values,
            next: Mutex::new(0),
        }
    }
}

impl RandomSource for SequenceRandomSource {
    fn next_f64(&self) -> f64 {
        let mut next = self.next.lock().expect("sequence lock poisoned");
        let value = self.values[*next % self.values.len()];
        *next += 1;
        value
    }
}
