use super::{Gradient, Hidden, Layer};
use crate::error::{Error, Result};
use crate::optim::Optimizer;
use crate::Matrix;

/// Hidden layers applied in order.
pub struct Sequential {
    layers: Vec<Box<dyn Hidden>>,
}

impl Sequential {
    pub fn new(layers: Vec<Box<dyn Hidden>>) -> Self {
        Sequential { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether every layer holds a forward pass to backpropagate.
    pub fn is_ready(&self) -> bool {
        self.layers.iter().all(|layer| layer.is_ready())
    }

    /// Compose the backward pass from the top layer down. The returned thunk
    /// evaluates the whole chain, each layer exactly once.
    ///
    /// Readiness is checked for the whole stack first, so `NotReady` leaves
    /// every memo in place.
    pub fn back(
        &mut self,
        output_gradient: Gradient,
        optimizer: &mut dyn Optimizer,
    ) -> Result<Gradient> {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }

        let mut grad = output_gradient;
        for layer in self.layers.iter_mut().rev() {
            grad = layer.back(grad, optimizer)?;
        }
        Ok(grad)
    }
}

impl Layer for Sequential {
    fn width(&self) -> Option<usize> {
        self.layers.last().and_then(|l| l.width())
    }

    fn init(&mut self, fan_in: usize) -> usize {
        self.layers
            .iter_mut()
            .fold(fan_in, |width, layer| layer.init(width))
    }

    fn forward(&mut self, mut input: Matrix) -> Matrix {
        for layer in &mut self.layers {
            input = layer.forward(input);
        }
        input
    }

    fn infer(&self, input: &Matrix) -> Matrix {
        self.layers
            .iter()
            .fold(input.clone(), |x, layer| layer.infer(&x))
    }
}

#[macro_export]
macro_rules! sequential {
    ($($layer:expr),* $(,)?) => {
        $crate::layers::Sequential::new(vec![
            $(Box::new($layer)),*
        ])
    };
}
