use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::activation::activation::ActivationFunction;
use crate::error::{DnnError, Result};

/// What the network is trained to do. Fixed per network; decides the output
/// activation and the loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Regression,
    Classification,
}

impl Mode {
    /// REGRESSION → linear; CLASSIFICATION → softmax for several outputs,
    /// sigmoid for a single one.
    pub fn output_activation(&self, output_size: usize) -> Result<ActivationFunction> {
        match (self, output_size) {
            (_, 0) => Err(DnnError::InvalidMode(format!(
                "{self} has no output activation for an empty output layer"
            ))),
            (Mode::Regression, _) => Ok(ActivationFunction::Linear),
            (Mode::Classification, 1) => Ok(ActivationFunction::Sigmoid),
            (Mode::Classification, _) => Ok(ActivationFunction::Softmax),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Regression => write!(f, "regression"),
            Mode::Classification => write!(f, "classification"),
        }
    }
}

impl FromStr for Mode {
    type Err = DnnError;

    fn from_str(s: &str) -> Result<Mode> {
        match s.to_ascii_lowercase().as_str() {
            "regression" => Ok(Mode::Regression),
            "classification" => Ok(Mode::Classification),
            other => Err(DnnError::InvalidMode(format!("unknown mode `{other}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_activation_per_mode() {
        assert_eq!(Mode::Regression.output_activation(3).unwrap(), ActivationFunction::Linear);
        assert_eq!(Mode::Classification.output_activation(1).unwrap(), ActivationFunction::Sigmoid);
        assert_eq!(Mode::Classification.output_activation(2).unwrap(), ActivationFunction::Softmax);
        assert!(matches!(
            Mode::Classification.output_activation(0),
            Err(DnnError::InvalidMode(_))
        ));
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!("REGRESSION".parse::<Mode>().unwrap(), Mode::Regression);
        assert_eq!(Mode::Classification.to_string(), "classification");
        assert!(matches!("ranking".parse::<Mode>(), Err(DnnError::InvalidMode(_))));
    }
}
