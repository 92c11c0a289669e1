pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod onnx;
pub mod pipeline;
pub mod training;
pub mod utils;

pub use error::{Error, Result};
