//! Network layers and the lazy gradient contract between them.
//!
//! Backpropagation is built as a chain of deferred computations: each hidden
//! layer receives the gradient thunk of the layer above it and returns a new
//! thunk. Nothing is evaluated until the caller invokes the outermost one.

pub mod activation;
pub mod sequential;

use crate::error::Result;
use crate::optim::Optimizer;
use crate::Matrix;

pub use activation::Activation;
pub use sequential::Sequential;

/// Single-shot deferred gradient computation.
pub type Gradient = Box<dyn FnOnce() -> Matrix>;

/// Wrap an already computed gradient in a thunk.
pub fn gradient(value: Matrix) -> Gradient {
    Box::new(move || value)
}

pub trait Layer {
    /// Output width, `None` until initialized.
    fn width(&self) -> Option<usize>;

    /// Initialize with the width of the layer below; returns the fan-out.
    fn init(&mut self, fan_in: usize) -> usize;

    /// Training pass. May memoize what `back` needs.
    fn forward(&mut self, input: Matrix) -> Matrix;

    /// Prediction-only pass. Never touches memoized state.
    fn infer(&self, input: &Matrix) -> Matrix;
}

pub trait Hidden: Layer {
    /// Whether a forward pass is waiting to be backpropagated.
    fn is_ready(&self) -> bool;

    /// Consume the memoized forward pass and return the gradient thunk for
    /// the layer below.
    fn back(&mut self, prev_gradient: Gradient, optimizer: &mut dyn Optimizer)
        -> Result<Gradient>;
}

/// Hidden layers without trainable parameters. They never step the optimizer.
pub trait Nonparametric: Hidden {}
