//! Error handling for the calibration engine
//!
//! None of these are fatal to the enclosing application: invalid input is
//! rejected synchronously with the state untouched, and persistence failures
//! degrade to in-memory operation.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Calibration engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    /// Measurement or derived ratio outside the plausible physical range
    #[error(transparent)]
    InvalidInput(#[from] shared::EstimateError),

    /// Operation requires a loaded and recomputed calibrator
    #[error("calibrator not ready: current phase is {0}")]
    NotReady(&'static str),

    /// No calibration point with the given animal id
    #[error("calibration point not found: {0}")]
    PointNotFound(String),

    /// Import payload failed structural validation; prior state kept
    #[error("invalid calibration import: {0}")]
    ImportValidation(String),

    /// The key-value store failed; reads degrade to defaults, writes keep the
    /// in-memory state usable
    #[error("calibration store unavailable: {0}")]
    PersistenceUnavailable(#[source] anyhow::Error),
}
