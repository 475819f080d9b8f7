use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Transfer functions a layer can be bound to. A layer's activation is fixed
/// at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    /// Identity. Used by the input layer and by the regression output layer.
    Linear,
    Sigmoid,
    /// Vector-valued; only used as a classification output paired with
    /// cross-entropy.
    Softmax,
    Tanh,
    ReLU,
}

impl ActivationFunction {
    /// Named factory: `linear`, `sigmoid`, `softmax`, `tanh` or `relu`.
    pub fn from_name(name: &str) -> Option<ActivationFunction> {
        match name.to_ascii_lowercase().as_str() {
            "linear" | "identity" => Some(ActivationFunction::Linear),
            "sigmoid" => Some(ActivationFunction::Sigmoid),
            "softmax" => Some(ActivationFunction::Softmax),
            "tanh" => Some(ActivationFunction::Tanh),
            "relu" => Some(ActivationFunction::ReLU),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Linear => "linear",
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Softmax => "softmax",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::ReLU => "relu",
        }
    }

    /// Applies the activation to a whole pre-activation vector.
    pub fn apply(&self, z: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => softmax(z),
            _ => z.iter().map(|&x| self.scalar(x)).collect(),
        }
    }

    /// Element-wise derivative evaluated at the pre-activation `z`.
    ///
    /// For `Softmax` this returns ones: the layer is always paired with
    /// cross-entropy, whose combined gradient `prediction - target` is already
    /// the output error, so the Jacobian must not be applied a second time.
    pub fn derivative(&self, z: &[f64]) -> Vec<f64> {
        z.iter()
            .map(|&x| match self {
                ActivationFunction::Linear => 1.0,
                ActivationFunction::Sigmoid => {
                    let fx = sigmoid(x);
                    fx * (1.0 - fx)
                }
                ActivationFunction::Softmax => 1.0,
                ActivationFunction::Tanh => {
                    let t = x.tanh();
                    1.0 - t * t
                }
                ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            })
            .collect()
    }

    fn scalar(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => x,
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Softmax => unreachable!("softmax is applied to the whole vector"),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

// Shifted by the max for numerical stability.
fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
