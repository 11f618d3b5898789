//! Strategy error types.

use pairmaker_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
