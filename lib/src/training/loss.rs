use burn::{
  nn::loss::{MseLoss, Reduction},
  tensor::{backend::Backend, Tensor},
};
use ndarray::Array2;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loss {
  /// Mean squared error over every element of the batch.
  #[default]
  Mse,
}

impl Loss {
  /// Scalar loss as a one-element tensor, differentiable on an autodiff backend.
  /// Shapes must already agree, see [`check_targets`].
  pub fn forward<B: Backend>(&self, pred: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
    match self {
      Loss::Mse => MseLoss::new().forward(pred, target, Reduction::Mean),
    }
  }
}

/// Rows and width of `target` against `pred`, each reported on its own.
pub fn check_targets(pred: (usize, usize), target: (usize, usize)) -> Result<()> {
  if pred.0 != target.0 {
    return Err(Error::shape("target rows", pred.0, target.0));
  }
  if pred.1 != target.1 {
    return Err(Error::shape("target width", pred.1, target.1));
  }
  Ok(())
}

pub fn mse_loss(pred: &Array2<f32>, target: &Array2<f32>) -> Result<f32> {
  check_targets(pred.dim(), target.dim())?;
  let diff = pred - target;
  Ok(diff.mapv(|d| d * d).sum() / pred.len() as f32)
}
