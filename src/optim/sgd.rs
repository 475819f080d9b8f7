use crate::error::Result;
use crate::network::network::Network;
use crate::process::gradients::Gradients;

pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies `-learning_rate * mean_gradient` to every layer of `network`.
    pub fn step(&self, network: &mut Network, mean_gradient: &Gradients) -> Result<()> {
        network.update_weights(&mean_gradient.scale(-self.learning_rate))
    }
}
