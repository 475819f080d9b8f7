//! Feed-forward networks trained by mini-batch backpropagation over
//! partitioned datasets.
//!
//! Per-example work (forward pass, backpropagation, cost, numerical
//! gradient) runs as pure maps over a [`ParallelCollection`]; per-example
//! gradients are summed with [`Gradients::combine`] and applied by the single
//! driver thread between map phases.

pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod data;
pub mod process;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{DnnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::neuron_layer::NeuronLayer;
pub use network::{Mode, Network, NetworkSpec, Topography};
pub use loss::LossType;
pub use data::{LabelledData, LabelledDataPoint, ParallelCollection, Partitioned, UnlabelledData};
pub use process::{BackPropagate, Cost, FeedForward, Gradients, LayerGradient, NumericalGradient};
pub use optim::sgd::Sgd;
pub use train::{EpochStats, GradientCheckReport, TrainConfig, TrainOutcome};
