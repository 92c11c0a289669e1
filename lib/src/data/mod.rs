pub mod dataset;
pub mod scaler;

pub use dataset::*;
pub use scaler::*;
