pub mod back_propagate;
pub mod cost;
pub mod feed_forward;
pub mod gradients;
pub mod numerical_gradient;

pub use back_propagate::BackPropagate;
pub use cost::Cost;
pub use feed_forward::{FeedForward, ForwardTrace};
pub use gradients::{Gradients, LayerGradient};
pub use numerical_gradient::NumericalGradient;
