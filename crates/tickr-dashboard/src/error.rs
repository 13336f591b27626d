//! Dashboard error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
