pub mod epoch_stats;
pub mod gradient_check;
pub mod loop_fn;
pub mod outcome;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use gradient_check::{gradient_check, GradientCheckReport, LayerComparison};
pub use loop_fn::{epoch_batches, mean_cost, train_loop};
pub use outcome::TrainOutcome;
pub use train_config::TrainConfig;
