//! Error types for the speedometer host.
//!
//! The core never fails; these cover what can go wrong around it: reading the
//! configuration file and starting worker threads.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Host error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML or has wrongly typed keys
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A worker thread could not be started
    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        /// Task name
        name: &'static str,
        /// Underlying OS error
        source: std::io::Error,
    },
}
