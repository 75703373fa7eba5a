//! # hatch-core
//!
//! Core crate for hatch. Contains the unified error system, runtime
//! settings, configuration values, and the layered configuration
//! resolution engine.
//!
//! This crate has **no** internal dependencies on other hatch crates.

pub mod config;
pub mod error;
pub mod layers;
pub mod result;

pub use error::{ErrorKind, HatchError};
pub use layers::{ConfigLayer, FoldDirection, LayeredConfig, Value};
pub use result::HatchResult;
