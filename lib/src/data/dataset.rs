use std::{fs::File, io::Read, path::Path};

use ndarray::Array2;
use tracing::info;

use crate::error::{Error, Result};

/// Feature and target matrices with one row per CSV record.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  pub features: Array2<f32>,
  pub targets: Array2<f32>,
}

impl Dataset {
  pub fn new(features: Array2<f32>, targets: Array2<f32>) -> Result<Self> {
    if features.nrows() != targets.nrows() {
      return Err(Error::shape("target rows", features.nrows(), targets.nrows()));
    }
    if features.nrows() == 0 {
      return Err(Error::EmptyDataset("in-memory dataset".to_string()));
    }
    Ok(Self { features, targets })
  }

  pub fn len(&self) -> usize {
    self.features.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.features.nrows() == 0
  }

  pub fn feature_dim(&self) -> usize {
    self.features.ncols()
  }

  pub fn target_dim(&self) -> usize {
    self.targets.ncols()
  }

  pub fn from_csv_path(
    path: &Path,
    feature_columns: &[String],
    target_columns: &[String],
  ) -> Result<Self> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let dataset = Self::from_reader(
      file,
      &path.display().to_string(),
      feature_columns,
      target_columns,
    )?;
    info!(
      path = %path.display(),
      rows = dataset.len(),
      features = dataset.feature_dim(),
      targets = dataset.target_dim(),
      "loaded dataset"
    );
    Ok(dataset)
  }

  /// Reads a headered CSV. `source` only names the input in error messages.
  pub fn from_reader<R: Read>(
    reader: R,
    source: &str,
    feature_columns: &[String],
    target_columns: &[String],
  ) -> Result<Self> {
    let mut rdr = csv::ReaderBuilder::new()
      .trim(csv::Trim::All)
      .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let locate = |column: &String| {
      headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| Error::MissingColumn {
          column: column.clone(),
          path: source.to_string(),
        })
    };
    let feature_idx = feature_columns.iter().map(&locate).collect::<Result<Vec<_>>>()?;
    let target_idx = target_columns.iter().map(&locate).collect::<Result<Vec<_>>>()?;

    let cell = |record: &csv::StringRecord, idx: usize, row: usize| -> Result<f32> {
      let raw = record.get(idx).unwrap_or_default();
      raw.parse::<f32>().map_err(|_| Error::Parse {
        row,
        column: headers.get(idx).unwrap_or_default().to_string(),
        value: raw.to_string(),
      })
    };

    let mut features = Vec::new();
    let mut targets = Vec::new();
    let mut rows = 0;
    for record in rdr.records() {
      let record = record?;
      rows += 1;
      for &idx in &feature_idx {
        features.push(cell(&record, idx, rows)?);
      }
      for &idx in &target_idx {
        targets.push(cell(&record, idx, rows)?);
      }
    }
    if rows == 0 {
      return Err(Error::EmptyDataset(source.to_string()));
    }

    let features = Array2::from_shape_vec((rows, feature_idx.len()), features)
      .map_err(|_| Error::shape("feature cells", rows * feature_idx.len(), rows))?;
    let targets = Array2::from_shape_vec((rows, target_idx.len()), targets)
      .map_err(|_| Error::shape("target cells", rows * target_idx.len(), rows))?;
    Ok(Self { features, targets })
  }
}
