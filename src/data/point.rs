use serde::{Serialize, Deserialize};

/// One training example: a feature vector and its target vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledDataPoint {
    pub features: Vec<f64>,
    pub target: Vec<f64>,
}

impl LabelledDataPoint {
    pub fn new(features: Vec<f64>, target: Vec<f64>) -> LabelledDataPoint {
        LabelledDataPoint { features, target }
    }
}
