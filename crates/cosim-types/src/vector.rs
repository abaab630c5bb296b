//! # Vector
//!
//! Resizable sequence of doubles used for field data exchange.

use crate::errors::{CoSimError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Ordered, resizable sequence of `f64`.
///
/// Cloning produces an independent copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    values: Vec<f64>,
}

impl Vector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vector of `len` zeros.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// Append a value.
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(CoSimError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    /// # Errors
    ///
    /// `IndexOutOfRange` if `index >= len()`.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(CoSimError::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Shrinking truncates, growing appends zeros.
    pub fn resize(&mut self, len: usize) {
        self.values.resize(len, 0.0);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Replace the whole content, keeping the allocation where possible.
    pub fn assign(&mut self, values: &[f64]) {
        self.values.clear();
        self.values.extend_from_slice(values);
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for Vector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl From<&[f64]> for Vector {
    fn from(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
