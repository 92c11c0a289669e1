use ndarray::Array2;

use super::proto::{
  tensor_shape_proto::dimension::Value as Dim, AttributeProto, DataType, GraphProto, ModelProto,
  NodeProto, OperatorSetIdProto, TensorProto, ValueInfoProto,
};
use crate::{
  error::{Error, Result},
  model::{CpuBackend, LayerOp, Sequential, PARAMETER_NAMES},
};

const TRACE_INPUT: &str = "%input";
const TRACE_OUTPUT: &str = "%output";

/// Names and metadata of the exported graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
  pub input_name: String,
  pub output_name: String,
  /// Declare the batch axis as the symbolic `batch_size` instead of the traced batch size.
  pub dynamic_batch: bool,
  pub opset_version: i64,
  pub producer_name: String,
  pub graph_name: String,
}

impl Default for ExportOptions {
  fn default() -> Self {
    Self {
      input_name: "input".to_string(),
      output_name: "output".to_string(),
      dynamic_batch: true,
      opset_version: 10,
      producer_name: env!("CARGO_PKG_NAME").to_string(),
      graph_name: "main_graph".to_string(),
    }
  }
}

/// One recorded op.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedNode {
  pub name: String,
  pub op_type: &'static str,
  pub inputs: Vec<String>,
  pub outputs: Vec<String>,
  pub attributes: Vec<AttributeProto>,
}

/// A parameter frozen at trace time.
#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
  pub name: String,
  pub dims: Vec<usize>,
  pub values: Vec<f32>,
}

/// The ops executed by one forward pass, with the parameter values it used.
///
/// Only the path taken for the representative input is recorded. The layers
/// supported here have no data-dependent branching, so that path is the
/// whole model.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedGraph {
  pub nodes: Vec<TracedNode>,
  pub initializers: Vec<Initializer>,
  pub input_dim: usize,
  pub output_dim: usize,
  pub traced_batch: usize,
  /// Model output for the representative input, kept for verification.
  pub sample_output: Array2<f32>,
}

/// Runs `model` once on `input` and records every op it performs.
///
/// Only an inference model is accepted; a model being trained has to go
/// through `valid()` first.
pub fn trace(model: &Sequential<CpuBackend>, input: &Array2<f32>) -> Result<TracedGraph> {
  if input.nrows() == 0 {
    return Err(Error::Export("representative input has no rows".to_string()));
  }
  let spec = model.spec();
  if input.ncols() != spec.input_dim {
    return Err(Error::shape("trace input width", spec.input_dim, input.ncols()));
  }

  let ops = model.ops()?;
  let mut nodes = Vec::with_capacity(ops.len());
  let mut initializers = Vec::new();
  let mut params = PARAMETER_NAMES.iter();
  let mut current_name = TRACE_INPUT.to_string();
  let last = ops.len() - 1;

  for (i, op) in ops.iter().enumerate() {
    let op_type = op.op_name();
    let name = format!("/net.{i}/{op_type}");
    let output = if i == last {
      TRACE_OUTPUT.to_string()
    } else {
      format!("{name}_output_0")
    };

    let mut inputs = vec![current_name];
    let mut attributes = Vec::new();
    if let LayerOp::Gemm(linear) = op {
      let (Some(weight), Some(bias)) = (params.next(), params.next()) else {
        return Err(Error::Export(format!("no parameter names left for {name}")));
      };
      initializers.push(Initializer {
        name: weight.to_string(),
        dims: vec![linear.out_features(), linear.in_features()],
        values: linear.weight.iter().copied().collect(),
      });
      initializers.push(Initializer {
        name: bias.to_string(),
        dims: vec![linear.out_features()],
        values: linear.bias.to_vec(),
      });
      inputs.push(weight.to_string());
      inputs.push(bias.to_string());
      attributes = vec![
        AttributeProto::float("alpha", 1.0),
        AttributeProto::float("beta", 1.0),
        AttributeProto::int("transB", 1),
      ];
    }

    nodes.push(TracedNode {
      name,
      op_type,
      inputs,
      outputs: vec![output.clone()],
      attributes,
    });
    current_name = output;
  }

  Ok(TracedGraph {
    nodes,
    initializers,
    input_dim: spec.input_dim,
    output_dim: spec.output_dim,
    traced_batch: input.nrows(),
    sample_output: model.predict(input)?,
  })
}

/// IR version that goes with an opset, per the ONNX versioning table.
pub fn ir_version_for(opset: i64) -> i64 {
  match opset {
    i64::MIN..=8 => 3,
    9 => 4,
    10 => 5,
    11 => 6,
    12..=14 => 7,
    15..=18 => 8,
    19..=20 => 9,
    _ => 10,
  }
}

impl TracedGraph {
  pub fn to_model_proto(&self, options: &ExportOptions) -> ModelProto {
    let rename = |name: &str| -> String {
      match name {
        TRACE_INPUT => options.input_name.clone(),
        TRACE_OUTPUT => options.output_name.clone(),
        other => other.to_string(),
      }
    };
    let batch = if options.dynamic_batch {
      Dim::DimParam("batch_size".to_string())
    } else {
      Dim::DimValue(self.traced_batch as i64)
    };

    let node = self
      .nodes
      .iter()
      .map(|n| NodeProto {
        input: n.inputs.iter().map(|s| rename(s)).collect(),
        output: n.outputs.iter().map(|s| rename(s)).collect(),
        name: n.name.clone(),
        op_type: n.op_type.to_string(),
        attribute: n.attributes.clone(),
        ..Default::default()
      })
      .collect();

    let initializer = self
      .initializers
      .iter()
      .map(|init| TensorProto {
        dims: init.dims.iter().map(|&d| d as i64).collect(),
        data_type: DataType::Float as i32,
        float_data: init.values.clone(),
        name: init.name.clone(),
        ..Default::default()
      })
      .collect();

    let graph = GraphProto {
      node,
      name: options.graph_name.clone(),
      initializer,
      input: vec![ValueInfoProto::float_tensor(
        &options.input_name,
        vec![batch.clone(), Dim::DimValue(self.input_dim as i64)],
      )],
      output: vec![ValueInfoProto::float_tensor(
        &options.output_name,
        vec![batch, Dim::DimValue(self.output_dim as i64)],
      )],
      ..Default::default()
    };

    ModelProto {
      ir_version: ir_version_for(options.opset_version),
      producer_name: options.producer_name.clone(),
      producer_version: env!("CARGO_PKG_VERSION").to_string(),
      graph: Some(graph),
      opset_import: vec![OperatorSetIdProto {
        domain: String::new(),
        version: options.opset_version,
      }],
      ..Default::default()
    }
  }
}
