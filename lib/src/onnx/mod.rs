pub mod export;
pub mod proto;
pub mod trace;

pub use export::*;
pub use trace::*;
