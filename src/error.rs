//! Error types for DrishtiStream
//!
//! Transient per-tick conditions (frame not ready, shape mismatch, pose
//! unavailable, non-zero sink push codes) are statuses carried by return
//! enums and counters, not errors; only activation, configuration, and I/O
//! level problems surface through [`Error`].

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// DrishtiStream error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested streaming port is already owned by an active session
    #[error("Port {0} is already used by another session")]
    PortConflict(u16),

    /// Session could not transition to the active state
    #[error("Activation failed: {0}")]
    ActivationFailed(String),

    /// Configuration value could not be used even after fallback
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Sink initialization or transport error
    #[error("Sink error: {0}")]
    Sink(String),

    /// Render graph error
    #[error("Render graph error: {0}")]
    RenderGraph(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parse error
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration file write error
    #[error("Config write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// Wire serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
