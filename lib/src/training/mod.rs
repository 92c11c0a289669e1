pub mod loss;
pub mod trainer;

pub use loss::*;
pub use trainer::*;
