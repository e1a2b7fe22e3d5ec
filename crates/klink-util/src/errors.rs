use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all klink operations.
#[derive(Debug, Error, Diagnostic)]
pub enum KlinkError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fatal IR linker condition. Raised only after the complete diagnostic
    /// has been delivered through the message sink; never recoverable.
    #[error("IR linker reported a fatal dependency issue")]
    Linker,

    /// Invocation of the external commonizer tool failed.
    #[error("Commonizer failed: {message}")]
    Commonizer { message: String },

    /// Kotlin/Native distribution discovery or configuration failed.
    #[error("Toolchain error: {message}")]
    #[diagnostic(help("Set KONAN_HOME or configure konan-home under [commonizer] in ~/.klink/config.toml"))]
    Toolchain { message: String },

    /// Invalid or malformed configuration (e.g. ~/.klink/config.toml).
    #[error("Config error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type KlinkResult<T> = miette::Result<T>;
