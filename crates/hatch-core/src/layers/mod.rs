//! Layered configuration: values, layers, and the resolution stack.

pub mod layer;
pub mod stack;
pub mod value;

pub use layer::ConfigLayer;
pub use stack::{FoldDirection, LayeredConfig};
pub use value::Value;
