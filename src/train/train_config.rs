use std::sync::mpsc;
use crate::train::epoch_stats::EpochStats;

/// Learning rate used when none is given.
pub const ETA: f64 = 0.1;
pub const MAX_EPOCHS: usize = 1000;
/// Largest absolute mean-gradient entry at which training stops.
pub const GRADIENT_CUTOFF: f64 = 1e-3;
pub const BATCHES_PER_EPOCH: usize = 10;
pub const REPORT_EVERY: usize = 10;

/// Configuration for a `train_loop` run. Read-only for the whole run.
///
/// # Fields
/// - `learning_rate`    : step size applied to the mean mini-batch gradient
/// - `max_epochs`       : training gives up after this many epochs
/// - `gradient_cutoff`  : convergence threshold on every mean-gradient entry
/// - `batches_per_epoch`: mini-batches each epoch's working set is split into
/// - `report_every`     : the full-dataset cost is computed every this many
///                         epochs (`0` disables it)
/// - `seed`             : seed for epoch and mini-batch sampling; entropy when `None`
/// - `progress_tx`      : optional channel sender; one `EpochStats` is sent per
///                         cost report. A dropped receiver is ignored.
pub struct TrainConfig {
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub gradient_cutoff: f64,
    pub batches_per_epoch: usize,
    pub report_every: usize,
    pub seed: Option<u64>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with ten batches per epoch, a cost report every
    /// ten epochs, random sampling and no progress channel.
    pub fn new(learning_rate: f64, max_epochs: usize, gradient_cutoff: f64) -> Self {
        TrainConfig {
            learning_rate,
            max_epochs,
            gradient_cutoff,
            batches_per_epoch: BATCHES_PER_EPOCH,
            report_every: REPORT_EVERY,
            seed: None,
            progress_tx: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_batches_per_epoch(mut self, batches: usize) -> Self {
        self.batches_per_epoch = batches;
        self
    }

    pub fn with_report_every(mut self, epochs: usize) -> Self {
        self.report_every = epochs;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(ETA, MAX_EPOCHS, GRADIENT_CUTOFF)
    }
}
