use serde::{Serialize, Deserialize};

/// Periodic training progress emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the loop
/// sends one value every `report_every` epochs, right after the cost over the
/// whole dataset has been computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub max_epochs: usize,
    /// Mean per-example cost over the full dataset.
    pub cost: f64,
    /// Wall-clock time since training started, in milliseconds.
    pub elapsed_ms: u64,
}
