use std::path::Path;

use ndarray::Array2;
use prost::Message;
use tracing::info;

use super::{
  proto::ModelProto,
  trace::{trace, ExportOptions, TracedGraph},
};
use crate::{
  error::{Error, Result},
  model::{CpuBackend, Sequential},
  utils::write_to_file,
};

/// Traces `model` on `input` and writes the graph and parameters to `path`.
///
/// `input` must have the model's input width; anything else fails before
/// the file is touched.
pub fn export(
  model: &Sequential<CpuBackend>,
  input: &Array2<f32>,
  path: &Path,
  options: &ExportOptions,
) -> Result<TracedGraph> {
  let traced = trace(model, input)?;
  let bytes = traced.to_model_proto(options).encode_to_vec();
  write_to_file(path, &bytes)?;
  info!(
    path = %path.display(),
    nodes = traced.nodes.len(),
    bytes = bytes.len(),
    opset = options.opset_version,
    "wrote onnx model"
  );
  Ok(traced)
}

pub fn load_model_proto(path: &Path) -> Result<ModelProto> {
  let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
  Ok(ModelProto::decode(bytes.as_slice())?)
}
