// src/activations.rs
//! Activation functions: pure, shape-preserving nonlinearities and their
//! local derivatives.
//!
//! Every kernel here maps a batch matrix (rows = samples, columns = neurons)
//! to a matrix of the same shape. Elementwise kernels run in parallel.

use crate::error::{Error, Result};
use crate::Matrix;
use ndarray::Zip;
use std::fmt::Debug;

pub trait ActivationFunction: Debug {
    /// Apply the nonlinearity.
    fn compute(&self, input: &Matrix) -> Matrix;

    /// Local derivative factor given the input and its activation. The
    /// result is multiplied elementwise with the upstream gradient.
    fn differentiate(&self, input: &Matrix, computed: &Matrix) -> Matrix;
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// --- ReLU ---
#[derive(Debug, Clone, Copy, Default)]
pub struct ReLU;

impl ReLU {
    pub fn new() -> Self {
        ReLU
    }
}

impl ActivationFunction for ReLU {
    fn compute(&self, input: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| x.max(0.0))
    }

    fn differentiate(&self, input: &Matrix, _computed: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| if x > 0.0 { 1.0 } else { 0.0 })
    }
}

// --- Leaky ReLU ---
#[derive(Debug, Clone, Copy)]
pub struct LeakyReLU {
    leakage: f64,
}

impl LeakyReLU {
    pub fn new(leakage: f64) -> Result<Self> {
        if leakage.is_nan() || leakage <= 0.0 || leakage >= 1.0 {
            return Err(Error::InvalidHyperparameter {
                param: "leakage".to_string(),
                value: leakage.to_string(),
                constraint: "0 < leakage < 1".to_string(),
            });
        }
        Ok(LeakyReLU { leakage })
    }

    pub fn leakage(&self) -> f64 {
        self.leakage
    }
}

impl Default for LeakyReLU {
    fn default() -> Self {
        LeakyReLU { leakage: 0.1 }
    }
}

impl ActivationFunction for LeakyReLU {
    fn compute(&self, input: &Matrix) -> Matrix {
        let leakage = self.leakage;
        Zip::from(input).par_map_collect(|&x| if x > 0.0 { x } else { leakage * x })
    }

    fn differentiate(&self, input: &Matrix, _computed: &Matrix) -> Matrix {
        let leakage = self.leakage;
        Zip::from(input).par_map_collect(|&x| if x > 0.0 { 1.0 } else { leakage })
    }
}

// --- ELU ---
#[derive(Debug, Clone, Copy)]
pub struct ELU {
    alpha: f64,
}

impl ELU {
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha.is_nan() || alpha < 0.0 {
            return Err(Error::InvalidHyperparameter {
                param: "alpha".to_string(),
                value: alpha.to_string(),
                constraint: "alpha >= 0".to_string(),
            });
        }
        Ok(ELU { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for ELU {
    fn default() -> Self {
        ELU { alpha: 1.0 }
    }
}

impl ActivationFunction for ELU {
    fn compute(&self, input: &Matrix) -> Matrix {
        let alpha = self.alpha;
        Zip::from(input).par_map_collect(|&x| if x > 0.0 { x } else { alpha * (x.exp() - 1.0) })
    }

    // below zero: d/dx alpha * (e^x - 1) = y + alpha
    fn differentiate(&self, input: &Matrix, computed: &Matrix) -> Matrix {
        let alpha = self.alpha;
        Zip::from(input)
            .and(computed)
            .par_map_collect(|&x, &y| if x > 0.0 { 1.0 } else { y + alpha })
    }
}

// --- Sigmoid ---
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn new() -> Self {
        Sigmoid
    }
}

impl ActivationFunction for Sigmoid {
    fn compute(&self, input: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| sigmoid(x))
    }

    // y * (1 - y)
    fn differentiate(&self, _input: &Matrix, computed: &Matrix) -> Matrix {
        Zip::from(computed).par_map_collect(|&y| y * (1.0 - y))
    }
}

// --- Tanh ---
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperbolicTangent;

impl HyperbolicTangent {
    pub fn new() -> Self {
        HyperbolicTangent
    }
}

impl ActivationFunction for HyperbolicTangent {
    fn compute(&self, input: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| x.tanh())
    }

    // 1 - y^2
    fn differentiate(&self, _input: &Matrix, computed: &Matrix) -> Matrix {
        Zip::from(computed).par_map_collect(|&y| 1.0 - y * y)
    }
}

// --- SiLU (Swish) ---
#[derive(Debug, Clone, Copy, Default)]
pub struct SiLU;

impl SiLU {
    pub fn new() -> Self {
        SiLU
    }
}

impl ActivationFunction for SiLU {
    fn compute(&self, input: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| x * sigmoid(x))
    }

    // sig + x * sig * (1 - sig)
    fn differentiate(&self, input: &Matrix, _computed: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| {
            let sig = sigmoid(x);
            sig + x * sig * (1.0 - sig)
        })
    }
}

// --- Fast GELU ---
#[derive(Debug, Clone, Copy, Default)]
pub struct Gelu;

impl Gelu {
    const C: f64 = 0.797_884_560_802_865_4; // sqrt(2 / pi)
    const K: f64 = 0.044715;

    pub fn new() -> Self {
        Gelu
    }
}

impl ActivationFunction for Gelu {
    fn compute(&self, input: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| {
            let x3 = x * x * x;
            0.5 * x * (1.0 + (Self::C * (x + Self::K * x3)).tanh())
        })
    }

    fn differentiate(&self, input: &Matrix, _computed: &Matrix) -> Matrix {
        Zip::from(input).par_map_collect(|&x| {
            let x3 = x * x * x;
            let tanh_i = (Self::C * (x + Self::K * x3)).tanh();
            let sech2 = 1.0 - tanh_i * tanh_i;
            0.5 * (1.0 + tanh_i) + 0.5 * x * sech2 * Self::C * (1.0 + 3.0 * Self::K * x * x)
        })
    }
}

// --- Softmax ---
/// Row-wise softmax. Its derivative is reported as the diagonal of the
/// Jacobian, `y * (1 - y)`, so it composes with the elementwise gradient
/// product like the other activations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Softmax;

impl Softmax {
    pub fn new() -> Self {
        Softmax
    }
}

impl ActivationFunction for Softmax {
    fn compute(&self, input: &Matrix) -> Matrix {
        let mut output = Matrix::zeros(input.raw_dim());

        Zip::from(output.outer_iter_mut())
            .and(input.outer_iter())
            .par_for_each(|mut y_row, x_row| {
                let max_val = x_row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                let mut sum = 0.0;

                for (y, &x) in y_row.iter_mut().zip(x_row.iter()) {
                    let e = (x - max_val).exp();
                    *y = e;
                    sum += e;
                }

                let inv_sum = 1.0 / sum;
                y_row.mapv_inplace(|y| y * inv_sum);
            });

        output
    }

    fn differentiate(&self, _input: &Matrix, computed: &Matrix) -> Matrix {
        Zip::from(computed).par_map_collect(|&y| y * (1.0 - y))
    }
}
