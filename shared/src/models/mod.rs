//! Domain models for the Cattle Weight Estimation Platform

mod bcs;
mod breed;
mod calibration;
mod estimate;
mod measurement;

pub use bcs::*;
pub use breed::*;
pub use calibration::*;
pub use estimate::*;
pub use measurement::*;
