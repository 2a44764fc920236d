//! Engine Error Types

use thiserror::Error;

/// Errors that can occur preparing or controlling the saturator
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Process configuration error: {0}")]
    ConfigError(String),

    #[error("DSP error: {0}")]
    DspError(#[from] satin_dsp::DspError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
