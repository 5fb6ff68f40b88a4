//! Shared numeric constants that rate functions close over.
//!
//! A [`Parameter`] is a cheap cloneable handle: a closure captures one clone,
//! a slider keeps another, and a `set` through either is seen by both.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A named `f64` cell shared between closures and their controller.
#[derive(Clone)]
pub struct Parameter {
    name: Arc<str>,
    bits: Arc<AtomicU64>,
}

impl Parameter {
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: Arc::from(name),
            bits: Arc::new(AtomicU64::new(value.to_bits())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// True if both handles share the same cell.
    pub fn same_as(&self, other: &Parameter) -> bool {
        Arc::ptr_eq(&self.bits, &other.bits)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let a = Parameter::new("k", 1.5);
        let b = a.clone();
        b.set(-2.0);
        assert_eq!(a.get(), -2.0);
        assert!(a.same_as(&b));
    }

    #[test]
    fn closures_observe_updates() {
        let k = Parameter::new("k", 2.0);
        let captured = k.clone();
        let f = move |x: f64| captured.get() * x;
        assert_eq!(f(3.0), 6.0);
        k.set(0.5);
        assert_eq!(f(3.0), 1.5);
    }

    #[test]
    fn distinct_parameters_are_not_same() {
        let a = Parameter::new("k", 1.0);
        let b = Parameter::new("k", 1.0);
        assert!(!a.same_as(&b));
        assert_eq!(a.name(), "k");
    }
}
