/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss:
    ///   L = -sum(expected[i] * log(predicted[i] + eps))
    ///
    /// `predicted`: softmax probabilities, shape [n_classes]
    /// `expected` : one-hot (or soft) target distribution, shape [n_classes]
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| -e * (p + EPS).ln())
            .sum()
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the pre-softmax
    /// logits:
    ///   ∂L/∂z_i = predicted[i] - expected[i]
    ///
    /// Valid when the target sums to one. The Softmax layer's own derivative
    /// is then identity so the Jacobian is not applied twice.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| p - e)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn picks_out_the_target_class() {
        let loss = CrossEntropyLoss::loss(&[0.25, 0.5, 0.25], &[0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(loss, std::f64::consts::LN_2, epsilon = 1e-9);
        assert_eq!(
            CrossEntropyLoss::derivative(&[0.25, 0.5, 0.25], &[0.0, 1.0, 0.0]),
            vec![0.25, -0.5, 0.25]
        );
    }
}
