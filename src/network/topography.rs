use serde::{Serialize, Deserialize};

use crate::error::{DnnError, Result};

/// Layer widths from input to output. Validated once, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topography(Vec<usize>);

impl Topography {
    /// At least two layers (input and output), every one non-empty.
    pub fn new(sizes: Vec<usize>) -> Result<Topography> {
        if sizes.len() < 2 {
            return Err(DnnError::InvalidTopography(format!(
                "need at least an input and an output layer, got {} layer(s)",
                sizes.len()
            )));
        }
        if let Some(index) = sizes.iter().position(|&size| size == 0) {
            return Err(DnnError::InvalidTopography(format!("layer {index} has no neurons")));
        }
        Ok(Topography(sizes))
    }

    pub fn sizes(&self) -> &[usize] {
        &self.0
    }

    pub fn input_size(&self) -> usize {
        self.0[0]
    }

    pub fn output_size(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    pub fn layer_count(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Vec<usize>> for Topography {
    type Error = DnnError;

    fn try_from(sizes: Vec<usize>) -> Result<Topography> {
        Topography::new(sizes)
    }
}

impl From<Topography> for Vec<usize> {
    fn from(topography: Topography) -> Vec<usize> {
        topography.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_two_or_more_positive_layers() {
        let t = Topography::new(vec![2, 3, 1]).unwrap();
        assert_eq!(t.input_size(), 2);
        assert_eq!(t.output_size(), 1);
        assert_eq!(t.layer_count(), 3);
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(matches!(Topography::new(vec![]), Err(DnnError::InvalidTopography(_))));
        assert!(matches!(Topography::new(vec![4]), Err(DnnError::InvalidTopography(_))));
        assert!(matches!(Topography::new(vec![1, 0, 1]), Err(DnnError::InvalidTopography(_))));
    }
}
