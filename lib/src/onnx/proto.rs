//! The subset of `onnx.proto` written by the exporter.
//!
//! Field numbers follow the upstream schema so any ONNX runtime can read the
//! encoded bytes. Fields the exporter never sets are left out.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelProto {
  #[prost(int64, tag = "1")]
  pub ir_version: i64,
  #[prost(string, tag = "2")]
  pub producer_name: String,
  #[prost(string, tag = "3")]
  pub producer_version: String,
  #[prost(string, tag = "4")]
  pub domain: String,
  #[prost(int64, tag = "5")]
  pub model_version: i64,
  #[prost(string, tag = "6")]
  pub doc_string: String,
  #[prost(message, optional, tag = "7")]
  pub graph: Option<GraphProto>,
  #[prost(message, repeated, tag = "8")]
  pub opset_import: Vec<OperatorSetIdProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OperatorSetIdProto {
  #[prost(string, tag = "1")]
  pub domain: String,
  #[prost(int64, tag = "2")]
  pub version: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GraphProto {
  #[prost(message, repeated, tag = "1")]
  pub node: Vec<NodeProto>,
  #[prost(string, tag = "2")]
  pub name: String,
  #[prost(message, repeated, tag = "5")]
  pub initializer: Vec<TensorProto>,
  #[prost(string, tag = "10")]
  pub doc_string: String,
  #[prost(message, repeated, tag = "11")]
  pub input: Vec<ValueInfoProto>,
  #[prost(message, repeated, tag = "12")]
  pub output: Vec<ValueInfoProto>,
  #[prost(message, repeated, tag = "13")]
  pub value_info: Vec<ValueInfoProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeProto {
  #[prost(string, repeated, tag = "1")]
  pub input: Vec<String>,
  #[prost(string, repeated, tag = "2")]
  pub output: Vec<String>,
  #[prost(string, tag = "3")]
  pub name: String,
  #[prost(string, tag = "4")]
  pub op_type: String,
  #[prost(message, repeated, tag = "5")]
  pub attribute: Vec<AttributeProto>,
  #[prost(string, tag = "6")]
  pub doc_string: String,
  #[prost(string, tag = "7")]
  pub domain: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AttributeType {
  Undefined = 0,
  Float = 1,
  Int = 2,
  String = 3,
  Tensor = 4,
  Graph = 5,
  Floats = 6,
  Ints = 7,
  Strings = 8,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttributeProto {
  #[prost(string, tag = "1")]
  pub name: String,
  #[prost(float, tag = "2")]
  pub f: f32,
  #[prost(int64, tag = "3")]
  pub i: i64,
  #[prost(bytes = "vec", tag = "4")]
  pub s: Vec<u8>,
  #[prost(float, repeated, tag = "7")]
  pub floats: Vec<f32>,
  #[prost(int64, repeated, tag = "8")]
  pub ints: Vec<i64>,
  #[prost(enumeration = "AttributeType", tag = "20")]
  pub r#type: i32,
}

impl AttributeProto {
  pub fn float(name: &str, value: f32) -> Self {
    Self {
      name: name.to_string(),
      f: value,
      r#type: AttributeType::Float as i32,
      ..Default::default()
    }
  }

  pub fn int(name: &str, value: i64) -> Self {
    Self {
      name: name.to_string(),
      i: value,
      r#type: AttributeType::Int as i32,
      ..Default::default()
    }
  }
}

/// `TensorProto.DataType` values used here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
  Undefined = 0,
  Float = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorProto {
  #[prost(int64, repeated, tag = "1")]
  pub dims: Vec<i64>,
  #[prost(enumeration = "DataType", tag = "2")]
  pub data_type: i32,
  #[prost(float, repeated, tag = "4")]
  pub float_data: Vec<f32>,
  #[prost(string, tag = "8")]
  pub name: String,
  #[prost(bytes = "vec", tag = "9")]
  pub raw_data: Vec<u8>,
  #[prost(string, tag = "12")]
  pub doc_string: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValueInfoProto {
  #[prost(string, tag = "1")]
  pub name: String,
  #[prost(message, optional, tag = "2")]
  pub r#type: Option<TypeProto>,
  #[prost(string, tag = "3")]
  pub doc_string: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeProto {
  #[prost(oneof = "type_proto::Value", tags = "1")]
  pub value: Option<type_proto::Value>,
  #[prost(string, tag = "6")]
  pub denotation: String,
}

pub mod type_proto {
  #[derive(Clone, PartialEq, ::prost::Message)]
  pub struct Tensor {
    #[prost(int32, tag = "1")]
    pub elem_type: i32,
    #[prost(message, optional, tag = "2")]
    pub shape: Option<super::TensorShapeProto>,
  }

  #[derive(Clone, PartialEq, ::prost::Oneof)]
  pub enum Value {
    #[prost(message, tag = "1")]
    TensorType(Tensor),
  }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorShapeProto {
  #[prost(message, repeated, tag = "1")]
  pub dim: Vec<tensor_shape_proto::Dimension>,
}

pub mod tensor_shape_proto {
  #[derive(Clone, PartialEq, ::prost::Message)]
  pub struct Dimension {
    #[prost(oneof = "dimension::Value", tags = "1, 2")]
    pub value: Option<dimension::Value>,
    #[prost(string, tag = "3")]
    pub denotation: String,
  }

  pub mod dimension {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
      #[prost(int64, tag = "1")]
      DimValue(i64),
      /// Symbolic size, e.g. `batch_size`.
      #[prost(string, tag = "2")]
      DimParam(String),
    }
  }
}

impl ValueInfoProto {
  pub fn float_tensor(name: &str, dims: Vec<tensor_shape_proto::dimension::Value>) -> Self {
    Self {
      name: name.to_string(),
      r#type: Some(TypeProto {
        value: Some(type_proto::Value::TensorType(type_proto::Tensor {
          elem_type: DataType::Float as i32,
          shape: Some(TensorShapeProto {
            dim: dims
              .into_iter()
              .map(|value| tensor_shape_proto::Dimension {
                value: Some(value),
                denotation: String::new(),
              })
              .collect(),
          }),
        })),
        denotation: String::new(),
      }),
      doc_string: String::new(),
    }
  }

  /// Declared dimensions, `None` for a symbolic one.
  pub fn dims(&self) -> Vec<Option<i64>> {
    use tensor_shape_proto::dimension::Value;
    match self.r#type.as_ref().and_then(|t| t.value.as_ref()) {
      Some(type_proto::Value::TensorType(tensor)) => tensor
        .shape
        .iter()
        .flat_map(|s| s.dim.iter())
        .map(|d| match d.value {
          Some(Value::DimValue(v)) => Some(v),
          _ => None,
        })
        .collect(),
      None => Vec::new(),
    }
  }
}
