use crate::activation::activation::ActivationFunction;
use crate::data::{LabelledDataPoint, ParallelCollection};
use crate::error::{check_len, DnnError, Result};
use crate::layers::neuron_layer::NeuronLayer;
use crate::network::mode::Mode;
use crate::network::spec::NetworkSpec;
use crate::network::topography::Topography;
use crate::optim::sgd::Sgd;
use crate::process::{BackPropagate, Cost, FeedForward, Gradients, NumericalGradient};
use crate::train::gradient_check::{gradient_check, GradientCheckReport};
use crate::train::loop_fn::train_loop;
use crate::train::outcome::TrainOutcome;
use crate::train::train_config::TrainConfig;

/// A feed-forward network: topography, mode and the layers that own every
/// weight.
///
/// Weights only change through `update_weights`, which takes `&mut self`;
/// every per-example process borrows the layers immutably, so a parallel
/// mapping phase always sees one consistent snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    topography: Topography,
    mode: Mode,
    layers: Vec<NeuronLayer>,
}

impl Network {
    /// Builds a network with sigmoid hidden layers and randomly initialised
    /// weights. Use `NetworkSpec` for a seed or another hidden activation.
    pub fn new(topography: &[usize], mode: Mode) -> Result<Network> {
        NetworkSpec::new(topography, mode).build()
    }

    /// Assembles a network from explicit layers.
    ///
    /// Layer 0 must be the input layer, each layer must consume the previous
    /// layer's output and the output activation must be the one `mode` calls for.
    pub fn from_layers(mode: Mode, layers: Vec<NeuronLayer>) -> Result<Network> {
        let topography = Topography::new(layers.iter().map(|l| l.size).collect())?;
        if !layers[0].is_input() {
            return Err(DnnError::InvalidTopography("layer 0 must be the input layer".into()));
        }
        for (index, pair) in layers.windows(2).enumerate() {
            let (previous, layer) = (&pair[0], &pair[1]);
            if layer.index != index + 1 {
                return Err(DnnError::InvalidTopography(format!(
                    "layer at position {} is indexed {}",
                    index + 1,
                    layer.index
                )));
            }
            check_len("layer fan-in", previous.size, layer.input_size())?;
            if index + 2 < layers.len() && layer.activation == ActivationFunction::Softmax {
                return Err(DnnError::InvalidMode(
                    "softmax is only available as a classification output".into(),
                ));
            }
        }

        let output = &layers[layers.len() - 1];
        let expected = mode.output_activation(output.size)?;
        if output.activation != expected {
            return Err(DnnError::InvalidMode(format!(
                "{mode} with {} output(s) needs a {} output layer, got {}",
                output.size,
                expected.name(),
                output.activation.name()
            )));
        }

        Ok(Network { topography, mode, layers })
    }

    pub fn topography(&self) -> &Topography {
        &self.topography
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn layers(&self) -> &[NeuronLayer] {
        &self.layers
    }

    pub fn feed_forward(&self) -> FeedForward<'_> {
        FeedForward::new(&self.layers)
    }

    pub fn back_propagate(&self) -> BackPropagate<'_> {
        BackPropagate::new(&self.layers, self.mode)
    }

    pub fn numerical_gradient(&self) -> NumericalGradient<'_> {
        NumericalGradient::new(&self.layers, self.mode)
    }

    pub fn cost(&self) -> Cost<'_> {
        Cost::new(self.mode, self.feed_forward())
    }

    /// Prediction for a single feature vector.
    pub fn run(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.feed_forward().compute(features)
    }

    /// Adds `delta` to every layer. All shapes are checked before the first
    /// layer is written, so a bad bundle leaves the network untouched.
    pub fn update_weights(&mut self, delta: &Gradients) -> Result<()> {
        check_len("gradient bundle", self.layers.len(), delta.layers.len())?;
        for (layer, gradient) in self.layers.iter().zip(&delta.layers) {
            layer.check_gradient(gradient)?;
        }
        for (layer, gradient) in self.layers.iter_mut().zip(&delta.layers) {
            layer.update_weights(gradient)?;
        }
        Ok(())
    }

    /// Fails with `DimensionMismatch` unless `point` fits this network.
    pub fn check_point(&self, point: &LabelledDataPoint) -> Result<()> {
        check_len("features", self.topography.input_size(), point.features.len())?;
        check_len("target", self.topography.output_size(), point.target.len())
    }

    /// Mini-batch training; see `train_loop`.
    pub fn train<C>(&mut self, data: &C, config: &TrainConfig) -> Result<TrainOutcome>
    where
        C: ParallelCollection<Item = LabelledDataPoint>,
    {
        let optimizer = Sgd::new(config.learning_rate);
        train_loop(self, data, &optimizer, config)
    }

    /// Labels every feature vector with the network's prediction.
    pub fn predict<C>(&self, data: &C) -> Result<C::Mapped<LabelledDataPoint>>
    where
        C: ParallelCollection<Item = Vec<f64>>,
    {
        let feed_forward = self.feed_forward();
        data.try_map(|features| feed_forward.label(features))
    }

    /// Compares analytic and numerical mean gradients over `data`.
    pub fn gradient_check<C>(&self, data: &C) -> Result<GradientCheckReport>
    where
        C: ParallelCollection<Item = LabelledDataPoint>,
    {
        gradient_check(self, data)
    }
}
