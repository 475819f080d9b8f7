/// Half sum-of-squares error, paired with a linear output layer.
pub struct MseLoss;

impl MseLoss {
    /// Scalar loss: ½‖predicted − expected‖²
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        0.5 * predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
    }

    /// ∂L/∂predicted: predicted − expected
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| a - b)
            .collect()
    }
}
