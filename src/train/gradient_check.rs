use log::debug;
use serde::{Serialize, Deserialize};

use crate::data::{LabelledDataPoint, ParallelCollection};
use crate::error::{DnnError, Result};
use crate::network::network::Network;
use crate::process::gradients::{Gradients, LayerGradient};
use crate::process::numerical_gradient::EPSILON;

/// Analytic vs numerical mean gradient of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerComparison {
    pub layer: usize,
    pub analytic: LayerGradient,
    pub numerical: LayerGradient,
    /// Largest absolute entry-wise difference.
    pub max_abs_difference: f64,
    /// ‖analytic − numerical‖ / (‖analytic‖ + ‖numerical‖), `0` when both vanish.
    pub relative_error: f64,
}

/// Result of `gradient_check`. Informational only: a large discrepancy is for
/// a human to look at, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientCheckReport {
    /// Perturbation used for the numerical estimate.
    pub epsilon: f64,
    pub examples: usize,
    pub layers: Vec<LayerComparison>,
}

impl GradientCheckReport {
    pub fn compare(analytic: &Gradients, numerical: &Gradients, examples: usize) -> GradientCheckReport {
        let layers = analytic.layers.iter()
            .zip(&numerical.layers)
            .enumerate()
            .map(|(layer, (a, n))| {
                let (a_entries, n_entries) = (entries(a), entries(n));
                let diff: Vec<f64> = a_entries.iter().zip(&n_entries).map(|(x, y)| x - y).collect();
                let norm = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
                let denominator = norm(&a_entries) + norm(&n_entries);
                LayerComparison {
                    layer,
                    analytic: a.clone(),
                    numerical: n.clone(),
                    max_abs_difference: diff.iter().fold(0.0, |acc: f64, d| acc.max(d.abs())),
                    relative_error: if denominator > 0.0 { norm(&diff) / denominator } else { 0.0 },
                }
            })
            .collect();
        GradientCheckReport { epsilon: EPSILON, examples, layers }
    }

    pub fn max_abs_difference(&self) -> f64 {
        self.layers.iter().fold(0.0, |acc: f64, l| acc.max(l.max_abs_difference))
    }

    pub fn max_relative_error(&self) -> f64 {
        self.layers.iter().fold(0.0, |acc: f64, l| acc.max(l.relative_error))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn entries(gradient: &LayerGradient) -> Vec<f64> {
    gradient.weights.data.iter()
        .flatten()
        .chain(&gradient.biases)
        .copied()
        .collect()
}

/// Computes the mean gradient over `data` twice, by backpropagation and by
/// central differences, and reports the per-layer comparison at debug level.
///
/// Both sums go through `Gradients::combine`, the same reduction training uses.
pub fn gradient_check<C>(network: &Network, data: &C) -> Result<GradientCheckReport>
where
    C: ParallelCollection<Item = LabelledDataPoint>,
{
    let examples = data.count();
    if examples == 0 {
        return Err(DnnError::EmptyDataset);
    }
    let scale = 1.0 / examples as f64;

    let numerical_gradient = network.numerical_gradient();
    let numerical = data
        .try_map(|point| numerical_gradient.compute(point))?
        .reduce(Gradients::combine)?
        .ok_or(DnnError::EmptyDataset)?
        .scale(scale);

    let back_propagate = network.back_propagate();
    let analytic = data
        .try_map(|point| back_propagate.compute(point))?
        .reduce(Gradients::combine)?
        .ok_or(DnnError::EmptyDataset)?
        .scale(scale);

    let report = GradientCheckReport::compare(&analytic, &numerical, examples);
    for layer in &report.layers {
        debug!("Derivative (Backpropagation) for Layer {} : {:?}", layer.layer, layer.analytic);
        debug!("Derivative (Numerical) for Layer {}        : {:?}", layer.layer, layer.numerical);
        debug!(
            "Layer {}: max |difference| = {:e}, relative error = {:e}",
            layer.layer, layer.max_abs_difference, layer.relative_error
        );
    }
    Ok(report)
}
