use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::loss::{bce::BceLoss, cross_entropy::CrossEntropyLoss, mse::MseLoss};
use crate::math::matrix::hadamard;
use crate::network::mode::Mode;

/// Selects the loss paired with a network's output layer.
///
/// - `Mse`               : half squared error; REGRESSION with a linear output.
/// - `BinaryCrossEntropy`: CLASSIFICATION with a single sigmoid output.
/// - `CrossEntropy`      : CLASSIFICATION with a softmax output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
    BinaryCrossEntropy,
}

impl LossType {
    /// The loss a network of `mode` with `output_size` outputs is trained on.
    pub fn for_mode(mode: Mode, output_size: usize) -> LossType {
        match mode {
            Mode::Regression => LossType::Mse,
            Mode::Classification if output_size > 1 => LossType::CrossEntropy,
            Mode::Classification => LossType::BinaryCrossEntropy,
        }
    }

    /// Scalar loss for one example.
    pub fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::Mse                => MseLoss::loss(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss::loss(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
        }
    }

    /// Output-layer error δ_L = ∂L/∂z_L.
    ///
    /// For the cross-entropy pairs the sigmoid/softmax Jacobian cancels and
    /// δ_L is `predicted - expected`. Squared error goes through the output
    /// activation's derivative, which is 1 for a linear output.
    pub fn output_delta(
        &self,
        predicted: &[f64],
        expected: &[f64],
        pre_activation: &[f64],
        activation: ActivationFunction,
    ) -> Vec<f64> {
        match self {
            LossType::Mse => hadamard(
                &MseLoss::derivative(predicted, expected),
                &activation.derivative(pre_activation),
            ),
            LossType::CrossEntropy       => CrossEntropyLoss::derivative(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
        }
    }
}
