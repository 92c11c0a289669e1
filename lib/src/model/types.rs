use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Squashing applied after the second linear layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
  None,
  /// Constrains every output to (0, 1), for probability-like targets.
  Sigmoid,
}

/// Layer widths of a `Linear -> ReLU -> Linear [-> Sigmoid]` network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
  pub input_dim: usize,
  pub hidden_dim: usize,
  pub output_dim: usize,
  pub output_activation: OutputActivation,
}

impl ModelSpec {
  pub fn new(input_dim: usize, hidden_dim: usize, output_dim: usize) -> Self {
    Self {
      input_dim,
      hidden_dim,
      output_dim,
      output_activation: OutputActivation::None,
    }
  }

  pub fn with_sigmoid(self) -> Self {
    Self {
      output_activation: OutputActivation::Sigmoid,
      ..self
    }
  }

  pub fn validate(&self) -> Result<()> {
    for (name, dim) in [
      ("input_dim", self.input_dim),
      ("hidden_dim", self.hidden_dim),
      ("output_dim", self.output_dim),
    ] {
      if dim == 0 {
        return Err(Error::InvalidDimension { name });
      }
    }
    Ok(())
  }

  pub fn num_parameters(&self) -> usize {
    (self.input_dim + 1) * self.hidden_dim + (self.hidden_dim + 1) * self.output_dim
  }
}
