// src/lib.rs
//! Activation layers with lazily composed backpropagation, and a robust
//! quartile-based feature standardizer.

pub mod activations;
pub mod datasets;
pub mod error;
pub mod layers;
pub mod optim;
pub mod stats;
pub mod transformers;

/// Batch matrix: rows are samples, columns are features or neurons.
pub type Matrix = ndarray::Array2<f64>;

pub use error::{Error, Result};
