use std::time::Instant;

use burn::{
  optim::{AdamConfig, GradientsParams, Optimizer, SgdConfig},
  tensor::{backend::AutodiffBackend, ElementConversion, Tensor},
};
use ndarray::Array2;
use serde::Serialize;
use tracing::{info, warn};

use super::{check_targets, Loss};
use crate::{
  config::{OptimizerKind, TrainConfig},
  error::{Error, Result},
  model::{to_tensor, Sequential},
};

/// Losses seen by one [`Trainer::fit`] run. `history[i]` is the loss of
/// epoch `i`, measured before that epoch's update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
  pub epochs: usize,
  pub initial_loss: f32,
  pub final_loss: f32,
  pub history: Vec<f32>,
}

/// Full-batch training: every epoch is one forward/backward pass over the
/// whole dataset followed by one optimizer step. No early stopping.
///
/// The optimizer and its moment estimates are created inside each
/// [`Trainer::fit`] call, so one trainer can fit any number of models.
#[derive(Debug, Clone)]
pub struct Trainer {
  optimizer: OptimizerKind,
  learning_rate: f32,
  loss: Loss,
  epochs: usize,
  report_interval: usize,
}

impl Trainer {
  pub fn new(optimizer: OptimizerKind, learning_rate: f32, epochs: usize, report_interval: usize) -> Self {
    Self {
      optimizer,
      learning_rate,
      loss: Loss::Mse,
      epochs,
      report_interval: report_interval.max(1),
    }
  }

  pub fn from_config(config: &TrainConfig) -> Self {
    Self::new(
      config.optimizer,
      config.learning_rate,
      config.epochs,
      config.report_interval,
    )
  }

  pub fn fit<B: AutodiffBackend>(
    &self,
    model: Sequential<B>,
    features: &Array2<f32>,
    targets: &Array2<f32>,
  ) -> Result<(Sequential<B>, TrainingReport)> {
    if features.nrows() == 0 {
      return Err(Error::EmptyDataset("training features".to_string()));
    }
    let spec = model.spec();
    if features.ncols() != spec.input_dim {
      return Err(Error::shape("feature width", spec.input_dim, features.ncols()));
    }
    check_targets((features.nrows(), spec.output_dim), targets.dim())?;

    let device = model.device();
    let x = to_tensor::<B>(features, &device);
    let y = to_tensor::<B>(targets, &device);

    if self.epochs == 0 {
      warn!("epochs is 0, the model keeps its initial parameters");
      let loss = self.loss.forward(model.forward(x), y).into_scalar().elem::<f32>();
      let report = TrainingReport {
        epochs: 0,
        initial_loss: loss,
        final_loss: loss,
        history: Vec::new(),
      };
      return Ok((model, report));
    }

    let (model, history) = match self.optimizer {
      OptimizerKind::Adam => {
        let optim = AdamConfig::new()
          .with_epsilon(1e-8)
          .init::<B, Sequential<B>>();
        self.run(optim, model, x, y)?
      }
      OptimizerKind::Sgd => self.run(SgdConfig::new().init::<B, Sequential<B>>(), model, x, y)?,
    };

    Ok((
      model,
      TrainingReport {
        epochs: self.epochs,
        initial_loss: history[0],
        final_loss: history[history.len() - 1],
        history,
      },
    ))
  }

  fn run<B, O>(
    &self,
    mut optim: O,
    mut model: Sequential<B>,
    x: Tensor<B, 2>,
    y: Tensor<B, 2>,
  ) -> Result<(Sequential<B>, Vec<f32>)>
  where
    B: AutodiffBackend,
    O: Optimizer<Sequential<B>, B>,
  {
    let mut history = Vec::with_capacity(self.epochs);
    let start = Instant::now();
    for epoch in 0..self.epochs {
      let loss = self.loss.forward(model.forward(x.clone()), y.clone());
      let value = loss.clone().into_scalar().elem::<f32>();
      if !value.is_finite() {
        return Err(Error::NonFiniteLoss { epoch });
      }
      let grads = GradientsParams::from_grads(loss.backward(), &model);
      model = optim.step(self.learning_rate as f64, model, grads);
      history.push(value);

      if epoch % self.report_interval == 0 {
        info!("Epoch {epoch}, Loss: {value:.4}");
      }
    }

    let elapsed = start.elapsed();
    info!(
      "Took {:.2}s, {:.2}µs / epoch",
      elapsed.as_secs_f32(),
      elapsed.as_micros() / self.epochs as u128
    );
    Ok((model, history))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    model::{ModelSpec, TrainBackend},
    training::mse_loss,
  };
  use ndarray::{array, Axis};
  use rand::{rngs::StdRng, Rng, SeedableRng};

  /// 100 rows with `risk = 0.5 c + 0.3 s + 0.2 b`, every value in [0, 1].
  fn linear_risk_data(seed: u64) -> (Array2<f32>, Array2<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((100, 3), |_| rng.gen::<f32>());
    let y = x
      .map_axis(Axis(1), |row| 0.5 * row[0] + 0.3 * row[1] + 0.2 * row[2])
      .insert_axis(Axis(1));
    (x, y)
  }

  fn model(spec: ModelSpec, seed: u64) -> Sequential<TrainBackend> {
    Sequential::new(spec, &mut StdRng::seed_from_u64(seed), &Default::default()).unwrap()
  }

  #[test]
  fn learns_linear_risk_score() {
    let (x, y) = linear_risk_data(42);
    let trainer = Trainer::new(OptimizerKind::Adam, 0.01, 200, 20);
    for seed in 0..5 {
      let (trained, report) = trainer
        .fit(model(ModelSpec::new(3, 8, 1).with_sigmoid(), seed), &x, &y)
        .unwrap();

      assert_eq!(report.history.len(), 200);
      assert!(
        report.final_loss < 0.1 * report.initial_loss,
        "seed {seed}: {} -> {}",
        report.initial_loss,
        report.final_loss
      );
      // the reported loss trails the weights by one step
      let after = mse_loss(&trained.predict(&x).unwrap(), &y).unwrap();
      assert!(after <= report.final_loss * 1.5);
    }
  }

  #[test]
  fn sgd_also_reduces_loss() {
    let (x, y) = linear_risk_data(7);
    let trainer = Trainer::new(OptimizerKind::Sgd, 0.1, 300, 100);
    let (_, report) = trainer.fit(model(ModelSpec::new(3, 8, 1), 11), &x, &y).unwrap();
    assert!(report.final_loss < report.initial_loss);
  }

  #[test]
  fn one_trainer_fits_models_of_different_widths() {
    let (x, y) = linear_risk_data(3);
    let trainer = Trainer::new(OptimizerKind::Adam, 0.01, 30, 10);
    let (_, wide) = trainer.fit(model(ModelSpec::new(3, 8, 1), 1), &x, &y).unwrap();
    let (_, narrow) = trainer.fit(model(ModelSpec::new(3, 4, 1), 2), &x, &y).unwrap();
    assert_eq!(wide.history.len(), 30);
    assert_eq!(narrow.history.len(), 30);

    // no optimizer state carries over from an earlier fit
    let fresh = Trainer::new(OptimizerKind::Adam, 0.01, 30, 10);
    let (_, again) = fresh.fit(model(ModelSpec::new(3, 4, 1), 2), &x, &y).unwrap();
    assert_eq!(narrow, again);
  }

  #[test]
  fn zero_epochs_leaves_model_untouched() {
    let (x, y) = linear_risk_data(1);
    let untrained = model(ModelSpec::new(3, 4, 1), 0);
    let before = untrained.predict(&x).unwrap();
    let trainer = Trainer::new(OptimizerKind::Adam, 0.01, 0, 20);
    let (after, report) = trainer.fit(untrained, &x, &y).unwrap();
    assert!(report.history.is_empty());
    assert_eq!(report.initial_loss, report.final_loss);
    assert_eq!(after.predict(&x).unwrap(), before);
  }

  #[test]
  fn non_finite_data_stops_training() {
    let x = array![[f32::NAN, 0.0, 1.0], [0.5, 0.5, 0.5]];
    let y = array![[0.1], [0.2]];
    let trainer = Trainer::new(OptimizerKind::Adam, 0.01, 10, 1);
    assert!(matches!(
      trainer.fit(model(ModelSpec::new(3, 4, 1), 0), &x, &y),
      Err(Error::NonFiniteLoss { epoch: 0 })
    ));
  }

  #[test]
  fn shape_errors_fail_fast() {
    let trainer = Trainer::new(OptimizerKind::Adam, 0.01, 5, 1);
    let spec = ModelSpec::new(3, 4, 1);

    let wrong_width = trainer.fit(model(spec, 0), &Array2::zeros((4, 2)), &Array2::zeros((4, 1)));
    assert!(matches!(
      wrong_width,
      Err(Error::ShapeMismatch { context: "feature width", .. })
    ));

    let wrong_target = trainer.fit(model(spec, 0), &Array2::zeros((4, 3)), &Array2::zeros((4, 2)));
    assert!(matches!(
      wrong_target,
      Err(Error::ShapeMismatch { context: "target width", expected: 1, actual: 2 })
    ));

    let wrong_rows = trainer.fit(model(spec, 0), &Array2::zeros((4, 3)), &Array2::zeros((3, 1)));
    assert!(matches!(
      wrong_rows,
      Err(Error::ShapeMismatch { context: "target rows", expected: 4, actual: 3 })
    ));

    let empty = trainer.fit(model(spec, 0), &Array2::zeros((0, 3)), &Array2::zeros((0, 1)));
    assert!(matches!(empty, Err(Error::EmptyDataset(_))));
  }
}
