use crate::data::point::LabelledDataPoint;
use crate::error::{check_len, Result};
use crate::loss::loss_type::LossType;
use crate::network::mode::Mode;
use crate::process::feed_forward::FeedForward;

/// Scalar loss of one example under the current weights.
///
/// REGRESSION uses ½‖prediction − target‖², CLASSIFICATION cross-entropy
/// (binary for a single sigmoid output, categorical for softmax).
#[derive(Debug, Clone, Copy)]
pub struct Cost<'a> {
    loss: LossType,
    feed_forward: FeedForward<'a>,
}

impl<'a> Cost<'a> {
    pub fn new(mode: Mode, feed_forward: FeedForward<'a>) -> Cost<'a> {
        Cost {
            loss: LossType::for_mode(mode, feed_forward.output_size()),
            feed_forward,
        }
    }

    pub fn loss_type(&self) -> LossType {
        self.loss
    }

    pub fn compute(&self, point: &LabelledDataPoint) -> Result<f64> {
        check_len("target", self.feed_forward.output_size(), point.target.len())?;
        let prediction = self.feed_forward.compute(&point.features)?;
        Ok(self.loss.loss(&prediction, &point.target))
    }
}
