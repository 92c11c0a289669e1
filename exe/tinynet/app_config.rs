use std::path::Path;

use netkit::config::{ExportConfig, TrainConfig};
use serde::Deserialize;

/// Config file format. Both sections are optional, and so is every field
/// inside them; missing fields keep their defaults.
///
/// ```yaml
/// export:
///   input_dim: 5
///   output_path: untrained.onnx
/// train:
///   dataset_path: health_risk_dataset.csv
///   epochs: 200
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
  pub export: Option<ExportConfig>,
  pub train: Option<TrainConfig>,
}

impl AppConfig {
  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      export: other.export.or(self.export),
      train: other.train.or(self.train),
    }
  }

  pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
      .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    Ok(serde_yaml::from_str(&text)?)
  }

  pub fn export_config(&self) -> ExportConfig {
    self.export.clone().unwrap_or_default()
  }

  pub fn train_config(&self) -> TrainConfig {
    self.train.clone().unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use netkit::config::OptimizerKind;

  #[test]
  fn partial_sections_keep_defaults() {
    let config: AppConfig = serde_yaml::from_str(
      "train:\n  epochs: 50\n  optimizer: sgd\n  learning_rate: 0.1\n",
    )
    .unwrap();
    let train = config.train_config();
    assert_eq!(train.epochs, 50);
    assert_eq!(train.optimizer, OptimizerKind::Sgd);
    assert_eq!(train.report_interval, 20);
    assert_eq!(train.feature_columns.len(), 3);
    assert_eq!(config.export_config(), ExportConfig::default());
  }

  #[test]
  fn later_config_wins() {
    let base: AppConfig = serde_yaml::from_str("export:\n  hidden_dim: 4\ntrain:\n  epochs: 3\n").unwrap();
    let over: AppConfig = serde_yaml::from_str("export:\n  hidden_dim: 7\n").unwrap();
    let merged = base.merge(over);
    assert_eq!(merged.export_config().hidden_dim, 7);
    assert_eq!(merged.train_config().epochs, 3);
  }

  #[test]
  fn unknown_section_is_rejected() {
    assert!(serde_yaml::from_str::<AppConfig>("serve:\n  port: 1\n").is_err());
    assert!(serde_yaml::from_str::<AppConfig>("train:\n  learning_rte: 0.1\n").is_err());
  }

  #[test]
  fn load_reads_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tinynet.yaml");
    std::fs::write(&path, "export:\n  seed: 11\n").unwrap();
    assert_eq!(AppConfig::load(&path).unwrap().export_config().seed, Some(11));
    assert!(AppConfig::load(&dir.path().join("absent.yaml")).is_err());
  }
}
