use serde::{Serialize, Deserialize};

/// How a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainOutcome {
    /// The mean gradient of a mini-batch in `epoch` was within the cutoff.
    Converged { epoch: usize },
    /// `max_epochs` passed without convergence.
    Exhausted,
}

impl TrainOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, TrainOutcome::Converged { .. })
    }

    pub fn epoch(&self) -> Option<usize> {
        match self {
            TrainOutcome::Converged { epoch } => Some(*epoch),
            TrainOutcome::Exhausted => None,
        }
    }

    /// The epoch reached, or `-1` when training did not converge.
    pub fn epoch_or_sentinel(&self) -> i64 {
        self.epoch().map_or(-1, |epoch| epoch as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_for_exhausted_runs() {
        assert_eq!(TrainOutcome::Converged { epoch: 12 }.epoch_or_sentinel(), 12);
        assert_eq!(TrainOutcome::Exhausted.epoch_or_sentinel(), -1);
        assert!(!TrainOutcome::Exhausted.is_converged());
        assert_eq!(TrainOutcome::Converged { epoch: 3 }.epoch(), Some(3));
    }
}
