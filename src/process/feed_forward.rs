use crate::data::point::LabelledDataPoint;
use crate::error::{check_len, DnnError, Result};
use crate::layers::neuron_layer::NeuronLayer;

/// Pre-activations and activations of every layer for one example.
/// Index 0 holds the raw features in both vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardTrace {
    pub pre_activations: Vec<Vec<f64>>,
    pub activations: Vec<Vec<f64>>,
}

impl ForwardTrace {
    pub fn output(&self) -> &[f64] {
        &self.activations[self.activations.len() - 1]
    }
}

/// Forward evaluation over a read-only snapshot of the layers.
#[derive(Debug, Clone, Copy)]
pub struct FeedForward<'a> {
    layers: &'a [NeuronLayer],
}

impl<'a> FeedForward<'a> {
    pub fn new(layers: &'a [NeuronLayer]) -> FeedForward<'a> {
        FeedForward { layers }
    }

    pub fn layers(&self) -> &'a [NeuronLayer] {
        self.layers
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.size)
    }

    /// Runs `features` through every layer and returns the output vector.
    pub fn compute(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.check_features(features)?;
        let mut current = features.to_vec();
        for layer in self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Forward pass that keeps every layer's `z` and `a`.
    pub fn trace(&self, features: &[f64]) -> Result<ForwardTrace> {
        self.check_features(features)?;
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut activations: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len());
        for layer in self.layers {
            let input = activations.last().map_or(features, Vec::as_slice);
            let (z, a) = layer.forward_traced(input)?;
            pre_activations.push(z);
            activations.push(a);
        }
        Ok(ForwardTrace { pre_activations, activations })
    }

    /// Pairs `features` with the prediction.
    pub fn label(&self, features: &[f64]) -> Result<LabelledDataPoint> {
        let prediction = self.compute(features)?;
        Ok(LabelledDataPoint::new(features.to_vec(), prediction))
    }

    fn check_features(&self, features: &[f64]) -> Result<()> {
        if self.layers.is_empty() {
            return Err(DnnError::InvalidTopography("no layers to evaluate".into()));
        }
        let expected = self.layers.first().map_or(0, |layer| layer.size);
        check_len("features", expected, features.len())
    }
}
