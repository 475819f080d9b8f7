pub mod neuron_layer;

pub use neuron_layer::NeuronLayer;
