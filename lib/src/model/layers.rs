use burn::{
  module::Param,
  nn::Linear,
  tensor::backend::Backend,
};
use ndarray::{Array1, Array2};
use rand::{
  distributions::{Distribution, Uniform},
  Rng,
};

use super::convert::{to_array, to_array_1d, to_tensor, to_tensor_1d};
use crate::error::{Error, Result};

/// Parameters of one affine layer `y = x W^T + b`, with `W` stored `[out, in]`.
///
/// This is the layout ONNX `Gemm` expects with `transB = 1`. Burn's
/// [`Linear`] keeps the transpose, `[in, out]`; the conversions below swap it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearWeights {
  pub weight: Array2<f32>,
  pub bias: Array1<f32>,
}

impl LinearWeights {
  /// Weights and biases drawn from `U(-1/sqrt(in), 1/sqrt(in))`.
  pub fn uniform<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
    let bound = 1.0 / (in_features as f32).sqrt();
    let dist = Uniform::new_inclusive(-bound, bound);
    let weight = Array2::from_shape_fn((out_features, in_features), |_| dist.sample(&mut *rng));
    let bias = Array1::from_shape_fn(out_features, |_| dist.sample(&mut *rng));
    Self { weight, bias }
  }

  pub fn from_parts(weight: Array2<f32>, bias: Array1<f32>) -> Result<Self> {
    if weight.nrows() != bias.len() {
      return Err(Error::shape("linear bias length", weight.nrows(), bias.len()));
    }
    Ok(Self { weight, bias })
  }

  pub fn in_features(&self) -> usize {
    self.weight.ncols()
  }

  pub fn out_features(&self) -> usize {
    self.weight.nrows()
  }

  pub fn to_linear<B: Backend>(&self, device: &B::Device) -> Linear<B> {
    let weight = to_tensor::<B>(&self.weight.t().to_owned(), device);
    Linear {
      weight: Param::from_tensor(weight),
      bias: Some(Param::from_tensor(to_tensor_1d::<B>(&self.bias, device))),
    }
  }

  pub fn from_linear<B: Backend>(linear: &Linear<B>) -> Result<Self> {
    let weight = to_array(linear.weight.val())?.t().to_owned();
    let bias = match &linear.bias {
      Some(bias) => to_array_1d(bias.val())?,
      None => Array1::zeros(weight.nrows()),
    };
    Self::from_parts(weight, bias)
  }
}

/// One op of the network as the exporter sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOp {
  Gemm(LinearWeights),
  Relu,
  Sigmoid,
}

impl LayerOp {
  pub fn op_name(&self) -> &'static str {
    match self {
      LayerOp::Gemm(_) => "Gemm",
      LayerOp::Relu => "Relu",
      LayerOp::Sigmoid => "Sigmoid",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::CpuBackend;
  use ndarray::array;
  use rand::{rngs::StdRng, SeedableRng};

  #[test]
  fn linear_matches_hand_computation() {
    let weights = LinearWeights::from_parts(array![[1.0, 0.0], [0.5, -1.0]], array![0.0, 1.0]).unwrap();
    let device = Default::default();
    let linear = weights.to_linear::<CpuBackend>(&device);
    let y = linear.forward(to_tensor::<CpuBackend>(&array![[2.0, 3.0]], &device));
    assert_eq!(to_array(y).unwrap(), array![[2.0, -1.0]]);
  }

  #[test]
  fn burn_layout_round_trip() {
    let weights = LinearWeights::from_parts(
      array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
      array![0.1, 0.2],
    )
    .unwrap();
    let linear = weights.to_linear::<CpuBackend>(&Default::default());
    assert_eq!(linear.weight.val().dims(), [3, 2]);
    assert_eq!(LinearWeights::from_linear(&linear).unwrap(), weights);
  }

  #[test]
  fn uniform_init_respects_fan_in_bound() {
    let mut rng = StdRng::seed_from_u64(7);
    let weights = LinearWeights::uniform(16, 4, &mut rng);
    assert_eq!(weights.weight.dim(), (4, 16));
    assert_eq!(weights.bias.len(), 4);
    assert!(weights.weight.iter().chain(weights.bias.iter()).all(|w| w.abs() <= 0.25));
  }

  #[test]
  fn from_parts_checks_bias_length() {
    assert!(matches!(
      LinearWeights::from_parts(Array2::zeros((2, 3)), Array1::zeros(3)),
      Err(Error::ShapeMismatch {
        expected: 2,
        actual: 3,
        ..
      })
    ));
  }

  #[test]
  fn op_names() {
    let ops = [LayerOp::Relu, LayerOp::Sigmoid];
    assert_eq!(ops.map(|op| op.op_name()), ["Relu", "Sigmoid"]);
  }
}
