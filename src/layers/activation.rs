use super::{Gradient, Hidden, Layer, Nonparametric};
use crate::activations::ActivationFunction;
use crate::error::{Error, Result};
use crate::optim::Optimizer;
use crate::Matrix;
use std::rc::Rc;

/// Applies a nonlinear activation function to its inputs.
///
/// Shape preserving: the fan-out equals the fan-in. A `forward` call
/// memoizes its input and output so the next `back` can differentiate; the
/// memo is single-use.
#[derive(Debug)]
pub struct Activation {
    activation_fn: Rc<dyn ActivationFunction>,
    width: Option<usize>,
    // (input, computed), set together and cleared together
    memo: Option<(Matrix, Matrix)>,
}

impl Activation {
    pub fn new(activation_fn: impl ActivationFunction + 'static) -> Self {
        Self::shared(Rc::new(activation_fn))
    }

    /// Build around a handle that other layers may also hold.
    pub fn shared(activation_fn: Rc<dyn ActivationFunction>) -> Self {
        Activation {
            activation_fn,
            width: None,
            memo: None,
        }
    }

    pub fn activation_fn(&self) -> &dyn ActivationFunction {
        self.activation_fn.as_ref()
    }
}

impl Layer for Activation {
    fn width(&self) -> Option<usize> {
        self.width
    }

    fn init(&mut self, fan_in: usize) -> usize {
        let fan_out = fan_in;
        self.width = Some(fan_out);
        fan_out
    }

    fn forward(&mut self, input: Matrix) -> Matrix {
        let computed = self.activation_fn.compute(&input);

        if self.memo.is_some() {
            log::trace!("activation layer: replacing an unconsumed forward pass");
        }
        self.memo = Some((input, computed.clone()));

        computed
    }

    fn infer(&self, input: &Matrix) -> Matrix {
        self.activation_fn.compute(input)
    }
}

impl Hidden for Activation {
    fn is_ready(&self) -> bool {
        self.memo.is_some()
    }

    fn back(
        &mut self,
        prev_gradient: Gradient,
        _optimizer: &mut dyn Optimizer,
    ) -> Result<Gradient> {
        let (input, computed) = self.memo.take().ok_or(Error::NotReady)?;
        let activation_fn = Rc::clone(&self.activation_fn);

        log::trace!("activation layer: deferring gradient for {:?} batch", input.dim());

        Ok(Box::new(move || {
            let upstream = prev_gradient();
            activation_fn.differentiate(&input, &computed) * upstream
        }))
    }
}

impl Nonparametric for Activation {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::{HyperbolicTangent, ReLU, Sigmoid};
    use crate::layers::gradient;
    use crate::optim::{Parameter, Stochastic};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// Counts every step it is asked to take.
    #[derive(Default)]
    struct CountingOptimizer {
        steps: usize,
    }

    impl Optimizer for CountingOptimizer {
        fn step(&mut self, _param: &mut Parameter, _gradient: &Matrix) {
            self.steps += 1;
        }
    }

    fn batch() -> Matrix {
        array![[-1.0, 0.5, 2.0], [3.0, -0.25, 0.0]]
    }

    #[test]
    fn init_passes_width_through() {
        let mut layer = Activation::new(ReLU);
        assert_eq!(layer.width(), None);

        assert_eq!(layer.init(10), 10);
        assert_eq!(layer.width(), Some(10));

        assert_eq!(layer.init(4), 4);
        assert_eq!(layer.width(), Some(4));
    }

    #[test]
    fn infer_matches_forward_without_memoizing() {
        let mut layer = Activation::new(Sigmoid);

        let inferred = layer.infer(&batch());
        assert!(!layer.is_ready());

        let forwarded = layer.forward(batch());
        assert!(layer.is_ready());
        assert_eq!(inferred, forwarded);
    }

    #[test]
    fn back_before_forward_is_not_ready() {
        let mut layer = Activation::new(ReLU);
        let mut opt = Stochastic::default();

        let err = layer.back(gradient(batch()), &mut opt).err();
        assert_eq!(err, Some(Error::NotReady));
    }

    #[test]
    fn memo_is_consumed_by_back() {
        let mut layer = Activation::new(ReLU);
        let mut opt = Stochastic::default();

        layer.forward(batch());
        assert!(layer.back(gradient(batch()), &mut opt).is_ok());
        assert!(!layer.is_ready());

        let err = layer.back(gradient(batch()), &mut opt).err();
        assert_eq!(err, Some(Error::NotReady));

        // a fresh forward re-arms the layer
        layer.forward(batch());
        assert!(layer.back(gradient(batch()), &mut opt).is_ok());
    }

    #[test]
    fn gradient_is_derivative_times_upstream() {
        let mut layer = Activation::new(HyperbolicTangent);
        let mut opt = Stochastic::default();
        let upstream = array![[1.0, 2.0, -1.0], [0.5, 0.5, 4.0]];

        let x = batch();
        let computed = layer.forward(x.clone());
        let grad = layer.back(gradient(upstream.clone()), &mut opt).unwrap()();

        let tanh = HyperbolicTangent;
        let expected = tanh.differentiate(&x, &tanh.compute(&x)) * &upstream;
        assert_abs_diff_eq!(grad, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(grad, computed.mapv(|y| 1.0 - y * y) * &upstream, epsilon = 1e-12);
    }

    #[test]
    fn gradient_uses_the_latest_forward_pass() {
        let mut layer = Activation::new(ReLU);
        let mut opt = Stochastic::default();

        layer.forward(array![[-1.0, -1.0]]);
        layer.forward(array![[1.0, -1.0]]);

        let grad = layer.back(gradient(array![[5.0, 5.0]]), &mut opt).unwrap()();
        assert_eq!(grad, array![[5.0, 0.0]]);
    }

    #[test]
    fn upstream_is_evaluated_only_on_demand() {
        use std::cell::Cell;

        let mut layer = Activation::new(ReLU);
        let mut opt = Stochastic::default();
        let evaluated = Rc::new(Cell::new(false));

        layer.forward(batch());
        let flag = Rc::clone(&evaluated);
        let thunk = layer
            .back(
                Box::new(move || {
                    flag.set(true);
                    Matrix::ones((2, 3))
                }),
                &mut opt,
            )
            .unwrap();

        assert!(!evaluated.get());
        let grad = thunk();
        assert!(evaluated.get());
        assert_eq!(grad, array![[0.0, 1.0, 1.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn optimizer_is_never_stepped() {
        let mut layer = Activation::new(Sigmoid);
        let mut opt = CountingOptimizer::default();

        layer.forward(batch());
        let grad = layer.back(gradient(Matrix::ones((2, 3))), &mut opt).unwrap();
        grad();

        assert_eq!(opt.steps, 0);
    }

    #[test]
    fn activation_fn_can_be_shared() {
        let sigmoid: Rc<dyn ActivationFunction> = Rc::new(Sigmoid);
        let mut a = Activation::shared(Rc::clone(&sigmoid));
        let b = Activation::shared(sigmoid);

        assert_eq!(a.forward(batch()), b.infer(&batch()));
    }
}
