//! Moving matrices between `ndarray` and backend tensors.

use burn::tensor::{backend::Backend, Tensor, TensorData};
use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

pub fn to_tensor<B: Backend>(x: &Array2<f32>, device: &B::Device) -> Tensor<B, 2> {
  let values: Vec<f32> = x.iter().copied().collect();
  Tensor::from_data(TensorData::new(values, [x.nrows(), x.ncols()]), device)
}

pub fn to_tensor_1d<B: Backend>(x: &Array1<f32>, device: &B::Device) -> Tensor<B, 1> {
  Tensor::from_data(TensorData::new(x.to_vec(), [x.len()]), device)
}

fn values<B: Backend, const D: usize>(t: Tensor<B, D>) -> Result<(Vec<usize>, Vec<f32>)> {
  let data = t.into_data().convert::<f32>();
  let shape = data.shape.clone();
  let values = data
    .to_vec::<f32>()
    .map_err(|e| Error::Tensor(format!("{e:?}")))?;
  Ok((shape, values))
}

pub fn to_array<B: Backend>(t: Tensor<B, 2>) -> Result<Array2<f32>> {
  let (shape, values) = values(t)?;
  Array2::from_shape_vec((shape[0], shape[1]), values).map_err(|e| Error::Tensor(e.to_string()))
}

pub fn to_array_1d<B: Backend>(t: Tensor<B, 1>) -> Result<Array1<f32>> {
  Ok(Array1::from(values(t)?.1))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::CpuBackend;
  use ndarray::array;

  #[test]
  fn matrices_keep_row_major_order() {
    let device = Default::default();
    let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let t = to_tensor::<CpuBackend>(&x, &device);
    assert_eq!(t.dims(), [2, 3]);
    assert_eq!(to_array(t.clone()).unwrap(), x);
    assert_eq!(to_array(t.transpose()).unwrap(), x.t().to_owned());
    let b = array![0.5, -1.0];
    assert_eq!(to_array_1d(to_tensor_1d::<CpuBackend>(&b, &device)).unwrap(), b);
  }
}
