use serde::{Serialize, Deserialize};
use std::ops::Add;

use crate::layers::neuron_layer::NeuronLayer;
use crate::math::matrix::Matrix;

/// Gradient of the loss with respect to one layer's parameters.
/// Shaped like the layer: `weights` is `(size, previous size)`, `biases` has
/// length `size`. The input layer's entry is an empty placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGradient {
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl LayerGradient {
    pub fn zeros(rows: usize, cols: usize) -> LayerGradient {
        LayerGradient {
            weights: Matrix::zeros(rows, cols),
            biases: vec![0.0; rows],
        }
    }

    pub fn scale(&self, factor: f64) -> LayerGradient {
        LayerGradient {
            weights: self.weights.scale(factor),
            biases: self.biases.iter().map(|b| b * factor).collect(),
        }
    }

    /// Largest absolute entry across weights and biases.
    pub fn max_abs(&self) -> f64 {
        self.biases.iter().fold(self.weights.max_abs(), |acc, b| acc.max(b.abs()))
    }

    /// True iff every entry satisfies `|g| <= cutoff`. NaN never does.
    pub fn is_bounded(&self, cutoff: f64) -> bool {
        let within = |g: &f64| g.abs() <= cutoff;
        self.weights.data.iter().flatten().all(within) && self.biases.iter().all(within)
    }
}

impl Add for LayerGradient {
    type Output = LayerGradient;

    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(self.biases.len(), rhs.biases.len(), "Matrices are of incorrect sizes");
        LayerGradient {
            weights: self.weights + rhs.weights,
            biases: self.biases.iter().zip(&rhs.biases).map(|(a, b)| a + b).collect(),
        }
    }
}

/// Ordered, layer-aligned gradient bundle: one entry per network layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradients {
    pub layers: Vec<LayerGradient>,
}

impl Gradients {
    /// A zero bundle aligned with `layers`.
    pub fn zeros_like(layers: &[NeuronLayer]) -> Gradients {
        Gradients {
            layers: layers.iter().map(NeuronLayer::zero_gradient).collect(),
        }
    }

    /// Reduction operator: element-wise sum of two index-aligned bundles.
    ///
    /// Associative and commutative up to floating-point rounding, so a
    /// reduction over a partitioned collection may combine in any order; the
    /// last bits of the result can differ between runs.
    ///
    /// # Panics
    /// Panics if the bundles come from differently shaped networks.
    pub fn combine(a: Gradients, b: Gradients) -> Gradients {
        assert_eq!(a.layers.len(), b.layers.len(), "gradient bundles are not layer-aligned");
        Gradients {
            layers: a.layers.into_iter().zip(b.layers).map(|(x, y)| x + y).collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Gradients {
        Gradients {
            layers: self.layers.iter().map(|l| l.scale(factor)).collect(),
        }
    }

    pub fn max_abs(&self) -> f64 {
        self.layers.iter().fold(0.0, |acc: f64, l| acc.max(l.max_abs()))
    }

    /// Convergence test: every entry of every layer is bounded by `cutoff`.
    /// One large entry anywhere blocks convergence.
    pub fn is_converged(&self, cutoff: f64) -> bool {
        self.layers.iter().all(|l| l.is_bounded(cutoff))
    }
}

impl Add for Gradients {
    type Output = Gradients;

    fn add(self, rhs: Self) -> Self::Output {
        Gradients::combine(self, rhs)
    }
}
