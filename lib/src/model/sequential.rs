use burn::{
  module::Module,
  nn::{Linear, Relu},
  tensor::{activation::sigmoid, backend::Backend, Tensor},
};
use ndarray::Array2;
use rand::Rng;
use tracing::debug;

use super::{
  convert::{to_array, to_tensor},
  layers::{LayerOp, LinearWeights},
  types::{ModelSpec, OutputActivation},
};
use crate::error::{Error, Result};

/// Parameter names in export order, after their position in the layer stack.
pub const PARAMETER_NAMES: [&str; 4] = ["net.0.weight", "net.0.bias", "net.2.weight", "net.2.bias"];

/// `Linear(in, hidden) -> ReLU -> Linear(hidden, out) [-> Sigmoid]`.
///
/// On an autodiff backend the model is trainable; `valid()` strips the
/// gradient tracking and gives the inference model that gets exported.
#[derive(Module, Debug)]
pub struct Sequential<B: Backend> {
  hidden: Linear<B>,
  activation: Relu,
  output: Linear<B>,
  sigmoid: bool,
}

impl<B: Backend> Sequential<B> {
  pub fn new<R: Rng + ?Sized>(spec: ModelSpec, rng: &mut R, device: &B::Device) -> Result<Self> {
    spec.validate()?;
    let first = LinearWeights::uniform(spec.input_dim, spec.hidden_dim, rng);
    let second = LinearWeights::uniform(spec.hidden_dim, spec.output_dim, rng);
    let model = Self::assemble(spec, &first, &second, device);
    debug!(
      input_dim = spec.input_dim,
      hidden_dim = spec.hidden_dim,
      output_dim = spec.output_dim,
      parameters = spec.num_parameters(),
      "initialized model"
    );
    Ok(model)
  }

  /// Builds a model around existing weights, checking they chain together.
  pub fn from_weights(
    spec: ModelSpec,
    first: &LinearWeights,
    second: &LinearWeights,
    device: &B::Device,
  ) -> Result<Self> {
    spec.validate()?;
    let checks = [
      ("first layer input width", spec.input_dim, first.in_features()),
      ("first layer output width", spec.hidden_dim, first.out_features()),
      ("second layer input width", spec.hidden_dim, second.in_features()),
      ("second layer output width", spec.output_dim, second.out_features()),
    ];
    for (context, expected, actual) in checks {
      if expected != actual {
        return Err(Error::shape(context, expected, actual));
      }
    }
    Ok(Self::assemble(spec, first, second, device))
  }

  fn assemble(
    spec: ModelSpec,
    first: &LinearWeights,
    second: &LinearWeights,
    device: &B::Device,
  ) -> Self {
    Self {
      hidden: first.to_linear(device),
      activation: Relu::new(),
      output: second.to_linear(device),
      sigmoid: spec.output_activation == OutputActivation::Sigmoid,
    }
  }

  pub fn spec(&self) -> ModelSpec {
    let [input_dim, hidden_dim] = self.hidden.weight.val().dims();
    let [_, output_dim] = self.output.weight.val().dims();
    ModelSpec {
      input_dim,
      hidden_dim,
      output_dim,
      output_activation: if self.sigmoid {
        OutputActivation::Sigmoid
      } else {
        OutputActivation::None
      },
    }
  }

  pub fn device(&self) -> B::Device {
    self.hidden.weight.val().device()
  }

  pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
    let x = self.hidden.forward(x);
    let x = self.activation.forward(x);
    let x = self.output.forward(x);
    if self.sigmoid {
      sigmoid(x)
    } else {
      x
    }
  }

  /// [`Self::forward`] on a matrix, rejecting a wrong width instead of broadcasting.
  pub fn predict(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
    let input_dim = self.spec().input_dim;
    if x.ncols() != input_dim {
      return Err(Error::shape("model input width", input_dim, x.ncols()));
    }
    if x.nrows() == 0 {
      return Ok(Array2::zeros((0, self.spec().output_dim)));
    }
    to_array(self.forward(to_tensor(x, &self.device())))
  }

  pub fn linear_weights(&self) -> Result<[LinearWeights; 2]> {
    Ok([
      LinearWeights::from_linear(&self.hidden)?,
      LinearWeights::from_linear(&self.output)?,
    ])
  }

  /// The ops of one forward pass in order, with the current parameter values.
  pub fn ops(&self) -> Result<Vec<LayerOp>> {
    let [first, second] = self.linear_weights()?;
    let mut ops = vec![LayerOp::Gemm(first), LayerOp::Relu, LayerOp::Gemm(second)];
    if self.sigmoid {
      ops.push(LayerOp::Sigmoid);
    }
    Ok(ops)
  }
}
