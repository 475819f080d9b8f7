/// Binary (per-output) cross-entropy, paired with a sigmoid output layer.
pub struct BceLoss;

const EPS: f64 = 1e-12;

impl BceLoss {
    /// Scalar loss: −Σ y·ln(p+ε) + (1−y)·ln(1−p+ε)
    ///
    /// Summed rather than averaged over outputs so that its gradient with
    /// respect to the sigmoid logits is exactly `p − y`.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln()))
            .sum()
    }

    /// Combined Sigmoid + BCE gradient w.r.t. the logits: p − y
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| p - y)
            .collect()
    }
}
