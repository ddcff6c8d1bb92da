/// Convenience result type used across the crate.
pub type SweepResult<T> = Result<T, SweepError>;

/// Top-level error taxonomy for the sweep/render pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    /// Invalid configuration or scene-object reference, detected before any
    /// scene or engine mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while configuring or arming the render engine.
    #[error("render error: {0}")]
    Render(String),

    /// The engine reported a finished frame but held no in-memory result.
    #[error("render result unavailable: {0}")]
    ResultUnavailable(String),

    /// Pop on an exhausted queue. Correct driver sequencing never triggers
    /// this; it indicates a scheduling bug, not bad user input.
    #[error("render queue underflow: pop on an empty queue")]
    QueueUnderflow,

    /// Filesystem failure while persisting frames, metadata or directories.
    #[error("io error: {0}")]
    Io(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SweepError {
    /// Build a [`SweepError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SweepError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SweepError::ResultUnavailable`] value.
    pub fn result_unavailable(msg: impl Into<String>) -> Self {
        Self::ResultUnavailable(msg.into())
    }

    /// Build a [`SweepError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`SweepError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
