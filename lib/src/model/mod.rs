pub mod convert;
pub mod layers;
pub mod sequential;
pub mod types;

pub use convert::*;
pub use layers::*;
pub use sequential::*;
pub use types::*;

/// CPU backend used for inference and export.
pub type CpuBackend = burn_ndarray::NdArray<f32>;
/// [`CpuBackend`] with gradient tracking, used while training.
pub type TrainBackend = burn::backend::Autodiff<CpuBackend>;
