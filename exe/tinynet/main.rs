mod app_config;

use netkit::*;

use app_config::AppConfig;
use clap::{Args, Parser, Subcommand};
use std::{error::Error, path::PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build an untrained network and export it to ONNX
  Export {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, value_name = "INT")]
    input_dim: Option<usize>,
    #[arg(long, value_name = "INT")]
    hidden_dim: Option<usize>,
    #[arg(long, value_name = "INT")]
    output_dim: Option<usize>,
  },
  /// Train the risk model on a CSV dataset and export it to ONNX
  Train {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(short, long, value_name = "PATH")]
    data: Option<PathBuf>,
    #[arg(short, long, value_name = "INT")]
    epochs: Option<usize>,
    #[arg(long, value_name = "FLOAT")]
    learning_rate: Option<f32>,
  },
}

#[derive(Args)]
struct CommonArgs {
  /// YAML file with `export` and `train` sections
  #[arg(short, long, value_name = "PATH")]
  config: Option<PathBuf>,
  /// Where the .onnx file is written
  #[arg(short, long, value_name = "PATH")]
  output: Option<PathBuf>,
  #[arg(long, value_name = "INT")]
  seed: Option<u64>,
}

impl CommonArgs {
  fn app_config(&self) -> Result<AppConfig, Box<dyn Error>> {
    let from_file = match &self.config {
      Some(path) => AppConfig::load(path)?,
      None => AppConfig::default(),
    };
    Ok(AppConfig::default().merge(from_file))
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  utils::init_logging()?;
  let args = Cli::parse();

  match args.command {
    Command::Export {
      common,
      input_dim,
      hidden_dim,
      output_dim,
    } => {
      let mut config = common.app_config()?.export_config();
      config.input_dim = input_dim.unwrap_or(config.input_dim);
      config.hidden_dim = hidden_dim.unwrap_or(config.hidden_dim);
      config.output_dim = output_dim.unwrap_or(config.output_dim);
      config.output_path = common.output.unwrap_or(config.output_path);
      config.seed = common.seed.or(config.seed);
      debug!(?config, "export");

      pipeline::run_export(&config)?;
      println!("Model exported to {}", config.output_path.display());
    }
    Command::Train {
      common,
      data,
      epochs,
      learning_rate,
    } => {
      let mut config = common.app_config()?.train_config();
      config.dataset_path = data.unwrap_or(config.dataset_path);
      config.epochs = epochs.unwrap_or(config.epochs);
      config.learning_rate = learning_rate.unwrap_or(config.learning_rate);
      config.output_path = common.output.unwrap_or(config.output_path);
      config.seed = common.seed.or(config.seed);
      debug!(?config, "train");

      pipeline::run_training(&config)?;
      println!("Model exported to {}", config.output_path.display());
    }
  }
  Ok(())
}
