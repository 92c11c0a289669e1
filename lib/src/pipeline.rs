//! The two end-to-end flows, each a plain function of its config.

use burn::module::AutodiffModule;
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::info;

use crate::{
  config::{ExportConfig, TrainConfig},
  data::{Dataset, MinMaxScaler},
  error::{Error, Result},
  model::{CpuBackend, Sequential, TrainBackend},
  onnx::{export, ExportOptions},
  training::{Trainer, TrainingReport},
};

fn rng_from(seed: Option<u64>) -> StdRng {
  match seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  }
}

fn export_options(dynamic_batch: bool, opset_version: i64) -> ExportOptions {
  ExportOptions {
    dynamic_batch,
    opset_version,
    ..Default::default()
  }
}

/// Builds an untrained network and writes it to `config.output_path`.
/// The graph is traced on one standard-normal row.
#[tracing::instrument(skip_all, fields(output = %config.output_path.display()))]
pub fn run_export(config: &ExportConfig) -> Result<Sequential<CpuBackend>> {
  config.validate()?;
  let mut rng = rng_from(config.seed);
  let model = Sequential::<CpuBackend>::new(config.model_spec(), &mut rng, &Default::default())?;

  let sample = Array2::from_shape_simple_fn((1, config.input_dim), || {
    rng.sample::<f32, _>(StandardNormal)
  });
  export(
    &model,
    &sample,
    &config.output_path,
    &export_options(config.dynamic_batch, config.opset_version),
  )?;
  info!("exported untrained model");
  Ok(model)
}

/// Everything produced by [`run_training`].
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
  /// The trained weights on the inference backend, as exported.
  pub model: Sequential<CpuBackend>,
  pub scaler: MinMaxScaler,
  pub report: TrainingReport,
}

impl TrainingOutcome {
  pub fn final_loss(&self) -> f32 {
    self.report.final_loss
  }
}

/// Loads the configured CSV, then trains and exports as [`train_on`] does.
#[tracing::instrument(skip_all, fields(dataset = %config.dataset_path.display()))]
pub fn run_training(config: &TrainConfig) -> Result<TrainingOutcome> {
  config.validate()?;
  let dataset = Dataset::from_csv_path(
    &config.dataset_path,
    &config.feature_columns,
    &config.target_columns,
  )?;
  train_on(config, dataset)
}

/// Scales `dataset`, trains for `config.epochs`, then writes the model to
/// `config.output_path` and the fitted scaler to `config.scaler_path()`.
pub fn train_on(config: &TrainConfig, dataset: Dataset) -> Result<TrainingOutcome> {
  config.validate()?;
  let spec = config.model_spec();
  if dataset.feature_dim() != spec.input_dim {
    return Err(Error::shape("dataset feature width", spec.input_dim, dataset.feature_dim()));
  }
  if dataset.target_dim() != spec.output_dim {
    return Err(Error::shape("dataset target width", spec.output_dim, dataset.target_dim()));
  }

  let (scaler, features) = MinMaxScaler::fit_transform(&dataset.features)?;

  let mut rng = rng_from(config.seed);
  let model = Sequential::<TrainBackend>::new(spec, &mut rng, &Default::default())?;
  let (model, report) = Trainer::from_config(config).fit(model, &features, &dataset.targets)?;
  info!(
    initial_loss = report.initial_loss,
    final_loss = report.final_loss,
    "training finished"
  );

  let model = model.valid();
  // the midpoint of the scaled range
  let sample = Array2::from_elem((1, spec.input_dim), 0.5);
  export(
    &model,
    &sample,
    &config.output_path,
    &export_options(config.dynamic_batch, config.opset_version),
  )?;

  let scaler_path = config.scaler_path();
  scaler.save(&scaler_path)?;
  info!(path = %scaler_path.display(), "wrote scaler");

  Ok(TrainingOutcome {
    model,
    scaler,
    report,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::onnx::load_model_proto;
  use std::{fmt::Write, path::Path};

  fn health_csv(path: &Path, rows: usize) {
    let mut rng = StdRng::seed_from_u64(9);
    let mut csv = String::from("patient,cholesterol,sugar,blood_pressure,risk_score\n");
    for i in 0..rows {
      let c: f32 = rng.gen_range(150.0..300.0);
      let s: f32 = rng.gen_range(70.0..200.0);
      let b: f32 = rng.gen_range(90.0..180.0);
      let risk = 0.5 * (c - 150.0) / 150.0 + 0.3 * (s - 70.0) / 130.0 + 0.2 * (b - 90.0) / 90.0;
      writeln!(csv, "p{i},{c},{s},{b},{risk}").unwrap();
    }
    std::fs::write(path, csv).unwrap();
  }

  #[test]
  fn export_flow_writes_untrained_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
      output_path: dir.path().join("network.onnx"),
      seed: Some(1),
      ..Default::default()
    };
    let model = run_export(&config).unwrap();
    assert_eq!(model.spec(), config.model_spec());

    let graph = load_model_proto(&config.output_path).unwrap().graph.unwrap();
    assert_eq!(graph.input[0].dims(), vec![None, Some(5)]);
    assert_eq!(graph.output[0].dims(), vec![None, Some(1)]);
    let ops: Vec<_> = graph.node.iter().map(|n| n.op_type.as_str()).collect();
    assert_eq!(ops, vec!["Gemm", "Relu", "Gemm"]);
  }

  #[test]
  fn export_flow_is_reproducible_with_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ExportConfig {
      output_path: dir.path().join("a.onnx"),
      seed: Some(5),
      ..Default::default()
    };
    run_export(&config).unwrap();
    config.output_path = dir.path().join("b.onnx");
    run_export(&config).unwrap();
    let a = std::fs::read(dir.path().join("a.onnx")).unwrap();
    let b = std::fs::read(dir.path().join("b.onnx")).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn export_flow_rejects_zero_width() {
    let config = ExportConfig {
      input_dim: 0,
      ..Default::default()
    };
    assert!(matches!(
      run_export(&config),
      Err(Error::InvalidDimension { name: "input_dim" })
    ));
  }

  #[test]
  fn training_flow_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("health_risk_dataset.csv");
    health_csv(&dataset_path, 100);
    let config = TrainConfig {
      dataset_path,
      output_path: dir.path().join("network.onnx"),
      seed: Some(3),
      ..Default::default()
    };
    let outcome = run_training(&config).unwrap();

    assert_eq!(outcome.report.epochs, 200);
    assert!(outcome.final_loss() < outcome.report.initial_loss);
    assert!(config.output_path.exists());

    let scaler = MinMaxScaler::load(&config.scaler_path()).unwrap();
    assert_eq!(scaler, outcome.scaler);
    assert_eq!(scaler.width(), 3);

    let graph = load_model_proto(&config.output_path).unwrap().graph.unwrap();
    let ops: Vec<_> = graph.node.iter().map(|n| n.op_type.as_str()).collect();
    assert_eq!(ops, vec!["Gemm", "Relu", "Gemm", "Sigmoid"]);
    assert_eq!(graph.initializer.len(), 4);

    let [first, _] = outcome.model.linear_weights().unwrap();
    let exported = &graph.initializer[0];
    assert_eq!(exported.name, "net.0.weight");
    assert_eq!(exported.dims, vec![8, 3]);
    assert_eq!(exported.float_data, first.weight.iter().copied().collect::<Vec<_>>());
  }

  #[test]
  fn training_flow_can_rerun_in_process() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("data.csv");
    health_csv(&dataset_path, 30);
    let config = TrainConfig {
      dataset_path,
      output_path: dir.path().join("network.onnx"),
      epochs: 20,
      seed: Some(8),
      ..Default::default()
    };
    let first = run_training(&config).unwrap();
    let second = run_training(&config).unwrap();
    assert_eq!(first.report, second.report);
  }

  #[test]
  fn training_flow_reports_missing_dataset_and_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
      dataset_path: dir.path().join("absent.csv"),
      output_path: dir.path().join("network.onnx"),
      ..Default::default()
    };
    assert!(matches!(run_training(&config), Err(Error::Io { .. })));

    let dataset_path = dir.path().join("data.csv");
    std::fs::write(&dataset_path, "cholesterol,sugar,risk_score\n1,2,0.5\n").unwrap();
    let config = TrainConfig {
      dataset_path,
      ..config
    };
    assert!(matches!(
      run_training(&config),
      Err(Error::MissingColumn { ref column, .. }) if column == "blood_pressure"
    ));
  }

  #[test]
  fn train_on_checks_dataset_width() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
      output_path: dir.path().join("network.onnx"),
      ..Default::default()
    };
    let dataset = Dataset::new(Array2::zeros((4, 2)), Array2::zeros((4, 1))).unwrap();
    assert!(matches!(
      train_on(&config, dataset),
      Err(Error::ShapeMismatch { .. })
    ));
    assert!(!config.output_path.exists());
  }
}
