use std::path::Path;

use itertools::{Itertools, MinMaxResult};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  utils::{deserialize_from_file, serialize_to_file},
};

/// Per-column min–max scaling into `[0, 1]`.
///
/// A constant column (max == min) is scaled with a range of 1, so all of its
/// values map to `0.0` instead of NaN.
///
/// The fitted bounds are saved next to an exported model; callers running
/// inference later must load them and apply the same transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
  pub min: Vec<f32>,
  pub max: Vec<f32>,
}

impl MinMaxScaler {
  pub fn fit(x: &Array2<f32>) -> Result<Self> {
    if x.nrows() == 0 {
      return Err(Error::EmptyDataset("scaler input".to_string()));
    }
    let (min, max) = x
      .axis_iter(Axis(1))
      .map(|column| match column.iter().copied().minmax() {
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::NoElements => (0.0, 0.0),
      })
      .unzip();
    Ok(Self { min, max })
  }

  pub fn width(&self) -> usize {
    self.min.len()
  }

  fn ranges(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
    self.min.iter().zip(self.max.iter()).map(|(&lo, &hi)| {
      let range = hi - lo;
      (lo, if range == 0.0 { 1.0 } else { range })
    })
  }

  fn check_width(&self, x: &Array2<f32>) -> Result<()> {
    if x.ncols() != self.width() {
      return Err(Error::shape("scaler input width", self.width(), x.ncols()));
    }
    Ok(())
  }

  pub fn transform(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
    self.check_width(x)?;
    let mut out = x.clone();
    for (mut column, (lo, range)) in out.axis_iter_mut(Axis(1)).zip(self.ranges()) {
      column.mapv_inplace(|v| (v - lo) / range);
    }
    Ok(out)
  }

  pub fn inverse_transform(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
    self.check_width(x)?;
    let mut out = x.clone();
    for (mut column, (lo, range)) in out.axis_iter_mut(Axis(1)).zip(self.ranges()) {
      column.mapv_inplace(|v| v * range + lo);
    }
    Ok(out)
  }

  pub fn fit_transform(x: &Array2<f32>) -> Result<(Self, Array2<f32>)> {
    let scaler = Self::fit(x)?;
    let scaled = scaler.transform(x)?;
    Ok((scaler, scaled))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    serialize_to_file(path, self)
  }

  pub fn load(path: &Path) -> Result<Self> {
    let scaler: Self = deserialize_from_file(path)?;
    if scaler.min.len() != scaler.max.len() {
      return Err(Error::shape("scaler max length", scaler.min.len(), scaler.max.len()));
    }
    Ok(scaler)
  }
}
