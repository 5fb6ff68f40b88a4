//! A field vector: a unit-space base and the tip its rate functions point to.

use std::sync::Arc;

use crate::axis::Axis;
use crate::ops::{self, Segment};

/// Rate of change along one axis, evaluated at a unit-space point.
pub type RateFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Wraps a closure as a [`RateFn`].
pub fn rate(f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> RateFn {
    Arc::new(f)
}

/// A vector with base and tip in unit coordinates.
///
/// `tip[i] = base[i] + rates[i](base)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    base: Vec<f64>,
    tip: Vec<f64>,
}

impl Vector {
    /// Evaluates `rates` at `base` to build the vector.
    pub fn new(base: Vec<f64>, rates: &[RateFn]) -> Self {
        let mut vector = Self {
            tip: base.clone(),
            base,
        };
        vector.recalculate(rates);
        vector
    }

    pub fn base(&self) -> &[f64] {
        &self.base
    }

    pub fn tip(&self) -> &[f64] {
        &self.tip
    }

    /// Re-evaluates the tip, e.g. after a rate function parameter changed.
    pub fn recalculate(&mut self, rates: &[RateFn]) {
        for (index, rate) in rates.iter().enumerate().take(self.base.len()) {
            self.tip[index] = self.base[index] + rate(&self.base);
        }
    }

    /// The vector as a unit-space segment.
    pub fn segment(&self) -> Segment {
        Segment::new(self.base.clone(), self.tip.clone())
    }

    /// Projects base and tip to pixel space through `axes`.
    pub fn pixels(&self, axes: &[Axis]) -> Segment {
        Segment::new(ops::pixels(&self.base, axes), ops::pixels(&self.tip, axes))
    }
}
