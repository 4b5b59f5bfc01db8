//! Self-calibrating weight estimation engine
//!
//! Owns the herd's persisted [`CalibrationState`](shared::CalibrationState):
//! turns scale-truth feedback into an improved girth/height ratio and serves
//! the estimator the best current ratio. Persistence goes through an opaque
//! key-value collaborator ([`store::CalibrationStore`]); the engine itself has
//! no opinion on whether that is a cloud store or browser storage.

pub mod calibrator;
pub mod config;
pub mod error;
pub mod seed;
pub mod store;

pub use calibrator::{
    CalibrationUpdate, Calibrator, CalibratorPhase, LoadFallback, LoadReport, NewCalibrationPoint,
};
pub use config::CalibratorConfig;
pub use error::{EngineError, EngineResult};
pub use store::{CalibrationStore, MemoryStore};
