use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::{check_len, DnnError, Result};
use crate::math::matrix::Matrix;
use crate::process::gradients::LayerGradient;

/// One layer of the network.
///
/// Layer 0 is the input layer: a linear pass-through with no real weights.
/// Every other layer holds `weights` of shape `(size, previous size)` and a
/// bias vector of length `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronLayer {
    pub index: usize,
    pub size: usize,
    weights: Matrix,
    biases: Vec<f64>,
    pub activation: ActivationFunction,
}

impl NeuronLayer {
    /// Builds the pass-through input layer.
    pub fn input(size: usize) -> NeuronLayer {
        NeuronLayer {
            index: 0,
            size,
            weights: Matrix::zeros(0, 0),
            biases: Vec::new(),
            activation: ActivationFunction::Linear,
        }
    }

    /// Builds a weighted layer with Xavier weights and zero biases.
    pub fn new<R: Rng>(
        index: usize,
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> NeuronLayer {
        NeuronLayer {
            index,
            size,
            weights: Matrix::xavier(size, input_size, rng),
            biases: vec![0.0; size],
            activation,
        }
    }

    /// Builds a weighted layer from explicit parameters.
    pub fn from_parts(
        index: usize,
        weights: Matrix,
        biases: Vec<f64>,
        activation: ActivationFunction,
    ) -> Result<NeuronLayer> {
        if index == 0 {
            return Err(DnnError::InvalidTopography(
                "layer 0 is the input layer and carries no weights".into(),
            ));
        }
        check_len("weight rows", weights.rows, weights.data.len())?;
        for row in &weights.data {
            check_len("weight columns", weights.cols, row.len())?;
        }
        check_len("layer biases", weights.rows, biases.len())?;
        Ok(NeuronLayer {
            index,
            size: weights.rows,
            weights,
            biases,
            activation,
        })
    }

    pub fn is_input(&self) -> bool {
        self.index == 0
    }

    /// Length of the vector this layer consumes.
    pub fn input_size(&self) -> usize {
        if self.is_input() { self.size } else { self.weights.cols }
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// `activation(W·input + b)`; identity for the input layer.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.forward_traced(input).map(|(_, a)| a)
    }

    /// Returns `(z, a)`: the pre-activation and the activation.
    pub fn forward_traced(&self, input: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        check_len("layer input", self.input_size(), input.len())?;
        if self.is_input() {
            return Ok((input.to_vec(), input.to_vec()));
        }
        let z: Vec<f64> = self.weights.mul_vec(input)
            .into_iter()
            .zip(&self.biases)
            .map(|(wx, b)| wx + b)
            .collect();
        let a = self.activation.apply(&z);
        Ok((z, a))
    }

    /// Adds `delta` to the weights and biases in place.
    ///
    /// The only way parameters change after construction. Shapes are checked
    /// before anything is written.
    pub fn update_weights(&mut self, delta: &LayerGradient) -> Result<()> {
        self.check_gradient(delta)?;

        self.weights += &delta.weights;
        for (b, d) in self.biases.iter_mut().zip(&delta.biases) {
            *b += d;
        }
        Ok(())
    }

    /// Fails unless `gradient` has exactly this layer's parameter shape.
    pub fn check_gradient(&self, gradient: &LayerGradient) -> Result<()> {
        if gradient.weights.shape() != self.weights.shape() {
            return Err(DnnError::DimensionMismatch {
                context: "weight gradient",
                expected: self.weights.rows * self.weights.cols,
                actual: gradient.weights.rows * gradient.weights.cols,
            });
        }
        check_len("bias gradient", self.biases.len(), gradient.biases.len())
    }

    /// A zero gradient shaped like this layer's parameters.
    pub fn zero_gradient(&self) -> LayerGradient {
        LayerGradient::zeros(self.weights.rows, self.weights.cols)
    }
}
