use crate::data::point::LabelledDataPoint;
use crate::error::Result;
use crate::layers::neuron_layer::NeuronLayer;
use crate::network::mode::Mode;
use crate::process::cost::Cost;
use crate::process::feed_forward::FeedForward;
use crate::process::gradients::Gradients;

/// Perturbation used for the central difference. The truncation error of the
/// estimate is O(EPSILON²).
pub const EPSILON: f64 = 1e-4;

/// Finite-difference estimate of the per-example gradient, for checking
/// `BackPropagate`. Costs two forward passes per parameter; never used while
/// training.
#[derive(Debug, Clone, Copy)]
pub struct NumericalGradient<'a> {
    layers: &'a [NeuronLayer],
    mode: Mode,
}

#[derive(Clone, Copy)]
enum Param {
    Weight(usize, usize),
    Bias(usize),
}

impl<'a> NumericalGradient<'a> {
    pub fn new(layers: &'a [NeuronLayer], mode: Mode) -> NumericalGradient<'a> {
        NumericalGradient { layers, mode }
    }

    /// `(cost(w + ε) − cost(w − ε)) / 2ε` for every weight and bias.
    pub fn compute(&self, point: &LabelledDataPoint) -> Result<Gradients> {
        // Validates both vectors before any perturbation.
        Cost::new(self.mode, FeedForward::new(self.layers)).compute(point)?;

        let mut scratch = self.layers.to_vec();
        let mut gradients = Gradients::zeros_like(self.layers);

        for index in 1..self.layers.len() {
            let (rows, cols) = self.layers[index].weights().shape();
            let params = (0..rows)
                .flat_map(|row| (0..cols).map(move |col| Param::Weight(row, col)))
                .chain((0..rows).map(Param::Bias));

            for param in params {
                let plus = self.perturbed_cost(&mut scratch, index, param, EPSILON, point)?;
                let minus = self.perturbed_cost(&mut scratch, index, param, -EPSILON, point)?;
                let estimate = (plus - minus) / (2.0 * EPSILON);
                match param {
                    Param::Weight(row, col) => gradients.layers[index].weights.data[row][col] = estimate,
                    Param::Bias(row) => gradients.layers[index].biases[row] = estimate,
                }
            }
        }

        Ok(gradients)
    }

    /// Cost with one parameter shifted by `shift`. The layer is restored from
    /// the original afterwards so shifts never accumulate rounding error.
    fn perturbed_cost(
        &self,
        scratch: &mut [NeuronLayer],
        index: usize,
        param: Param,
        shift: f64,
        point: &LabelledDataPoint,
    ) -> Result<f64> {
        let original = &self.layers[index];
        let mut delta = original.zero_gradient();
        match param {
            Param::Weight(row, col) => delta.weights.data[row][col] = shift,
            Param::Bias(row) => delta.biases[row] = shift,
        }
        scratch[index].update_weights(&delta)?;
        let cost = Cost::new(self.mode, FeedForward::new(scratch)).compute(point);
        scratch[index] = original.clone();
        cost
    }
}
