use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  model::{ModelSpec, OutputActivation},
};

/// Optimizer used by the training loop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
  #[default]
  Adam,
  Sgd,
}

/// Settings of the export-only flow: an untrained network written to ONNX.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
  pub input_dim: usize,
  pub hidden_dim: usize,
  pub output_dim: usize,
  pub output_activation: OutputActivation,
  pub output_path: PathBuf,
  /// Seed for parameter initialization and the tracing input. Entropy when absent.
  pub seed: Option<u64>,
  pub dynamic_batch: bool,
  pub opset_version: i64,
}

impl Default for ExportConfig {
  fn default() -> Self {
    Self {
      input_dim: 5,
      hidden_dim: 20,
      output_dim: 1,
      output_activation: OutputActivation::None,
      output_path: PathBuf::from("network.onnx"),
      seed: None,
      dynamic_batch: true,
      opset_version: 10,
    }
  }
}

impl ExportConfig {
  pub fn model_spec(&self) -> ModelSpec {
    ModelSpec {
      input_dim: self.input_dim,
      hidden_dim: self.hidden_dim,
      output_dim: self.output_dim,
      output_activation: self.output_activation,
    }
  }

  pub fn validate(&self) -> Result<()> {
    self.model_spec().validate()?;
    check_opset(self.opset_version)
  }
}

/// Settings of the train-and-export flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
  pub dataset_path: PathBuf,
  pub feature_columns: Vec<String>,
  pub target_columns: Vec<String>,
  pub hidden_dim: usize,
  pub output_activation: OutputActivation,
  pub optimizer: OptimizerKind,
  pub learning_rate: f32,
  pub epochs: usize,
  /// Progress is logged on every epoch divisible by this.
  pub report_interval: usize,
  pub output_path: PathBuf,
  /// Where the fitted scaler goes. Defaults to `<output stem>.scaler.json`.
  pub scaler_path: Option<PathBuf>,
  pub seed: Option<u64>,
  pub dynamic_batch: bool,
  pub opset_version: i64,
}

impl Default for TrainConfig {
  fn default() -> Self {
    Self {
      dataset_path: PathBuf::from("health_risk_dataset.csv"),
      feature_columns: vec![
        "cholesterol".to_string(),
        "sugar".to_string(),
        "blood_pressure".to_string(),
      ],
      target_columns: vec!["risk_score".to_string()],
      hidden_dim: 8,
      output_activation: OutputActivation::Sigmoid,
      optimizer: OptimizerKind::Adam,
      learning_rate: 0.01,
      epochs: 200,
      report_interval: 20,
      output_path: PathBuf::from("network.onnx"),
      scaler_path: None,
      seed: None,
      dynamic_batch: true,
      opset_version: 10,
    }
  }
}

impl TrainConfig {
  pub fn model_spec(&self) -> ModelSpec {
    ModelSpec {
      input_dim: self.feature_columns.len(),
      hidden_dim: self.hidden_dim,
      output_dim: self.target_columns.len(),
      output_activation: self.output_activation,
    }
  }

  pub fn scaler_path(&self) -> PathBuf {
    match &self.scaler_path {
      Some(path) => path.clone(),
      None => self.output_path.with_extension("scaler.json"),
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.feature_columns.is_empty() {
      return Err(Error::InvalidDimension {
        name: "feature_columns",
      });
    }
    if self.target_columns.is_empty() {
      return Err(Error::InvalidDimension {
        name: "target_columns",
      });
    }
    self.model_spec().validate()?;
    if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
      return Err(Error::InvalidConfig(format!(
        "learning_rate must be a positive number, got {}",
        self.learning_rate
      )));
    }
    if self.report_interval == 0 {
      return Err(Error::InvalidConfig(
        "report_interval must be at least 1".to_string(),
      ));
    }
    check_opset(self.opset_version)
  }
}

// Gemm with transB and Sigmoid as used by the exporter exist from opset 7 on.
fn check_opset(version: i64) -> Result<()> {
  if version < 7 {
    return Err(Error::InvalidConfig(format!(
      "opset_version {version} is not supported, use 7 or newer"
    )));
  }
  Ok(())
}
