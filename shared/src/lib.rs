//! Shared types and models for the Cattle Weight Estimation Platform
//!
//! This crate contains the pure domain layer shared between the calibration
//! engine, the browser adapter (via WASM), and other components of the system:
//! measurement models, breed data, the weight estimator, and input validation.

pub mod error;
pub mod estimator;
pub mod models;
pub mod reference;
pub mod validation;

pub use error::*;
pub use estimator::*;
pub use models::*;
pub use validation::*;
