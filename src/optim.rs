use crate::Matrix;
use ndarray::Zip;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_PARAMETER_ID: AtomicUsize = AtomicUsize::new(0);

/// A trainable matrix with a process-unique id. Optimizers key their
/// per-parameter state on the id.
#[derive(Debug, Clone)]
pub struct Parameter {
    id: usize,
    pub value: Matrix,
}

impl Parameter {
    pub fn new(value: Matrix) -> Self {
        Parameter {
            id: NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed),
            value,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

pub trait Optimizer {
    /// Apply one update to `param` given its gradient.
    fn step(&mut self, param: &mut Parameter, gradient: &Matrix);
}

/// Stochastic gradient descent with optional momentum.
#[derive(Debug, Clone)]
pub struct Stochastic {
    rate: f64,
    momentum: f64,
    velocities: HashMap<usize, Matrix>,
}

impl Stochastic {
    pub fn new(rate: f64) -> Self {
        Stochastic {
            rate,
            momentum: 0.0, // plain SGD
            velocities: HashMap::new(),
        }
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Stochastic::new(0.01)
    }
}

impl Optimizer for Stochastic {
    fn step(&mut self, param: &mut Parameter, gradient: &Matrix) {
        let lr = self.rate;

        if self.momentum == 0.0 {
            // w -= lr * g
            Zip::from(&mut param.value)
                .and(gradient)
                .for_each(|w, &g| *w -= lr * g);
            return;
        }

        let m = self.momentum;
        let velocity = self
            .velocities
            .entry(param.id())
            .or_insert_with(|| Matrix::zeros(param.value.raw_dim()));

        // v = m * v + g; w -= lr * v
        Zip::from(&mut param.value)
            .and(velocity)
            .and(gradient)
            .for_each(|w, v, &g| {
                *v = m * *v + g;
                *w -= lr * *v;
            });
    }
}

#[derive(Debug, Clone)]
struct Moments {
    step_count: i32,
    exp_avg: Matrix,
    exp_avg_sq: Matrix,
}

/// Adam with bias-corrected first and second moment estimates.
#[derive(Debug, Clone)]
pub struct Adam {
    rate: f64,
    betas: (f64, f64),
    eps: f64,
    moments: HashMap<usize, Moments>,
}

impl Adam {
    pub fn new(rate: f64) -> Self {
        Adam {
            rate,
            betas: (0.9, 0.999),
            eps: 1e-8,
            moments: HashMap::new(),
        }
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.betas = (beta1, beta2);
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::new(0.001)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, param: &mut Parameter, gradient: &Matrix) {
        let (beta1, beta2) = self.betas;
        let lr = self.rate;
        let eps = self.eps;

        let state = self.moments.entry(param.id()).or_insert_with(|| Moments {
            step_count: 0,
            exp_avg: Matrix::zeros(param.value.raw_dim()),
            exp_avg_sq: Matrix::zeros(param.value.raw_dim()),
        });
        state.step_count += 1;

        let bias_correction1 = 1.0 - beta1.powi(state.step_count);
        let bias_correction2 = 1.0 - beta2.powi(state.step_count);

        // m = b1*m + (1-b1)*g, v = b2*v + (1-b2)*g^2
        // w -= lr * (m/bc1) / (sqrt(v/bc2) + eps)
        Zip::from(&mut param.value)
            .and(&mut state.exp_avg)
            .and(&mut state.exp_avg_sq)
            .and(gradient)
            .for_each(|w, m, v, &g| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / bias_correction1;
                let v_hat = *v / bias_correction2;
                *w -= lr * (m_hat / (v_hat.sqrt() + eps));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn parameters_get_distinct_ids() {
        let a = Parameter::new(array![[1.0]]);
        let b = Parameter::new(array![[1.0]]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn sgd_steps_against_the_gradient() {
        let mut param = Parameter::new(array![[1.0, -1.0]]);
        let mut sgd = Stochastic::new(0.5);

        sgd.step(&mut param, &array![[2.0, -2.0]]);
        assert_abs_diff_eq!(param.value, array![[0.0, 0.0]]);
    }

    #[test]
    fn momentum_accumulates_velocity() {
        let mut param = Parameter::new(array![[0.0]]);
        let mut sgd = Stochastic::new(1.0).with_momentum(0.5);

        sgd.step(&mut param, &array![[1.0]]); // v = 1
        sgd.step(&mut param, &array![[1.0]]); // v = 1.5
        assert_abs_diff_eq!(param.value[[0, 0]], -2.5);
    }

    #[test]
    fn adam_first_step_moves_by_rate() {
        let mut param = Parameter::new(array![[1.0, 1.0]]);
        let mut adam = Adam::new(0.1);

        // bias correction makes the first update lr * sign(g)
        adam.step(&mut param, &array![[4.0, -0.5]]);
        assert_abs_diff_eq!(param.value, array![[0.9, 1.1]], epsilon = 1e-6);
    }

    #[test]
    fn adam_minimizes_a_quadratic() {
        let mut param = Parameter::new(array![[5.0]]);
        let mut adam = Adam::new(0.1);

        for _ in 0..300 {
            let grad = param.value.mapv(|w| 2.0 * w);
            adam.step(&mut param, &grad);
        }
        assert!(param.value[[0, 0]].abs() < 0.5);
    }
}
