use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

#[cfg(not(debug_assertions))]
use human_panic::setup_panic;
use tracing::subscriber::SetGlobalDefaultError;

#[cfg(debug_assertions)]
extern crate better_panic;

use crate::error::{Error, Result};

// [NOTE] tracing
//
// Library code logs through the `tracing` macros only; the binary decides
// where the events go by calling `init_logging` once at startup.

pub fn install_logger() -> Result<(), SetGlobalDefaultError> {
  let subscriber = tracing_subscriber::fmt().compact().with_target(false);

  #[cfg(debug_assertions)]
  let subscriber = subscriber.with_max_level(tracing::Level::DEBUG);
  #[cfg(not(debug_assertions))]
  let subscriber = subscriber.with_max_level(tracing::Level::INFO);

  let subscriber = subscriber.finish();
  tracing::subscriber::set_global_default(subscriber)
}

pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
  // Human Panic. Only enabled when *not* debugging.
  #[cfg(not(debug_assertions))]
  {
    setup_panic!();
  }

  // Better Panic. Only enabled *when* debugging.
  #[cfg(debug_assertions)]
  {
    better_panic::Settings::debug()
      .most_recent_first(false)
      .lineno_suffix(true)
      .verbosity(better_panic::Verbosity::Full)
      .install();
  }

  install_logger()?;

  Ok(())
}

pub fn write_to_file(path: &Path, bytes: &[u8]) -> Result<()> {
  std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

pub fn serialize_to_file<T: Serialize>(path: &Path, obj: &T) -> Result<()> {
  let buff = serde_json::to_string_pretty(obj)?;
  write_to_file(path, buff.as_bytes())
}

pub fn deserialize_from_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
  Ok(serde_json::from_str(&content)?)
}
