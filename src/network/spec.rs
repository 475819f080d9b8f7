use rand::{rngs::StdRng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{DnnError, Result};
use crate::layers::neuron_layer::NeuronLayer;
use crate::network::mode::Mode;
use crate::network::network::Network;
use crate::network::topography::Topography;

fn default_hidden_activation() -> ActivationFunction {
    ActivationFunction::Sigmoid
}

/// Serializable description of a network to build.
///
/// The output activation is never configured directly: it follows from
/// `mode` and the output width (see `Mode::output_activation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Layer widths, input first.
    pub topography: Vec<usize>,
    pub mode: Mode,
    /// Activation of every hidden layer.
    #[serde(default = "default_hidden_activation")]
    pub hidden_activation: ActivationFunction,
    /// Seed for weight initialization; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn new(topography: &[usize], mode: Mode) -> NetworkSpec {
        NetworkSpec {
            topography: topography.to_vec(),
            mode,
            hidden_activation: default_hidden_activation(),
            seed: None,
        }
    }

    pub fn with_hidden_activation(mut self, activation: ActivationFunction) -> NetworkSpec {
        self.hidden_activation = activation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> NetworkSpec {
        self.seed = Some(seed);
        self
    }

    /// Validates the description and allocates every layer.
    pub fn build(&self) -> Result<Network> {
        let topography = Topography::new(self.topography.clone())?;
        if self.hidden_activation == ActivationFunction::Softmax {
            return Err(DnnError::InvalidMode(
                "softmax is only available as a classification output".into(),
            ));
        }
        let output_activation = self.mode.output_activation(topography.output_size())?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let sizes = topography.sizes();
        let last = sizes.len() - 1;
        let mut layers = Vec::with_capacity(sizes.len());
        layers.push(NeuronLayer::input(sizes[0]));
        for index in 1..sizes.len() {
            let activation = if index == last { output_activation } else { self.hidden_activation };
            layers.push(NeuronLayer::new(index, sizes[index], sizes[index - 1], activation, &mut rng));
        }

        Network::from_layers(self.mode, layers)
    }
}
