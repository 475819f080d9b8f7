use crate::data::point::LabelledDataPoint;
use crate::error::{check_len, DnnError, Result};
use crate::layers::neuron_layer::NeuronLayer;
use crate::loss::loss_type::LossType;
use crate::math::matrix::{hadamard, Matrix};
use crate::network::mode::Mode;
use crate::process::feed_forward::FeedForward;
use crate::process::gradients::{Gradients, LayerGradient};

/// Per-example gradient of the loss with respect to every layer's weights
/// and biases, computed by backpropagation over a read-only snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BackPropagate<'a> {
    layers: &'a [NeuronLayer],
    loss: LossType,
}

impl<'a> BackPropagate<'a> {
    pub fn new(layers: &'a [NeuronLayer], mode: Mode) -> BackPropagate<'a> {
        let output_size = layers.last().map_or(0, |layer| layer.size);
        BackPropagate {
            layers,
            loss: LossType::for_mode(mode, output_size),
        }
    }

    /// Gradient bundle for one example, index-aligned with the layers.
    ///
    /// Both vectors are checked against the topography before any arithmetic.
    pub fn compute(&self, point: &LabelledDataPoint) -> Result<Gradients> {
        if self.layers.is_empty() {
            return Err(DnnError::InvalidTopography("no layers to differentiate".into()));
        }
        let feed_forward = FeedForward::new(self.layers);
        check_len("target", feed_forward.output_size(), point.target.len())?;
        let trace = feed_forward.trace(&point.features)?;

        let last = self.layers.len() - 1;
        let mut gradients = Gradients::zeros_like(self.layers);

        // δ_L
        let mut delta = self.loss.output_delta(
            trace.output(),
            &point.target,
            &trace.pre_activations[last],
            self.layers[last].activation,
        );

        for index in (1..=last).rev() {
            let weights = Matrix::outer(&delta, &trace.activations[index - 1]);
            let below = if index > 1 {
                self.propagate(index, &delta, &trace.pre_activations[index - 1])
            } else {
                Vec::new()
            };
            gradients.layers[index] = LayerGradient {
                weights,
                biases: std::mem::replace(&mut delta, below),
            };
        }

        Ok(gradients)
    }

    /// δ_{l-1} = (W_lᵀ · δ_l) ⊙ σ'(z_{l-1})
    fn propagate(&self, index: usize, delta: &[f64], pre_activation_below: &[f64]) -> Vec<f64> {
        let back = self.layers[index].weights().transpose().mul_vec(delta);
        let derivative = self.layers[index - 1].activation.derivative(pre_activation_below);
        hadamard(&back, &derivative)
    }
}
