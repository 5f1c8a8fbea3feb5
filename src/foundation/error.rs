/// Result alias used across the crate.
pub type FlexResult<T> = Result<T, FlexError>;

/// Errors surfaced by the layout-bound node stage.
#[derive(thiserror::Error, Debug)]
pub enum FlexError {
    /// A hierarchy edit inconsistent with the current tree state. Always a programmer error.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A style patch that failed validation. Nothing from the patch was applied.
    #[error("invalid style: {0}")]
    InvalidStyle(String),

    /// Text or image metrics could not be produced.
    #[error("measurement error: {0}")]
    Measurement(String),

    /// Invalid stage or driver configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Error reported by the layout solver.
    #[error("solver error: {0}")]
    Solver(#[from] taffy::TaffyError),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlexError {
    /// Build an [`FlexError::InvalidTopology`].
    pub fn topology(msg: impl Into<String>) -> Self {
        Self::InvalidTopology(msg.into())
    }

    /// Build an [`FlexError::InvalidStyle`].
    pub fn style(msg: impl Into<String>) -> Self {
        Self::InvalidStyle(msg.into())
    }

    /// Build an [`FlexError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`FlexError::Measurement`].
    pub fn measurement(msg: impl Into<String>) -> Self {
        Self::Measurement(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
