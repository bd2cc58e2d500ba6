//! # Error Module / 错误模块
//!
//! The error taxonomy of the execution engine. Each variant maps to one failure
//! class with its own propagation policy: registration conflicts are fatal at
//! startup, missing runner plugins degrade to skipped tests, parse failures
//! abort the run, and reporter failures are isolated per reporter.
//!
//! 执行引擎的错误分类。每个变体对应一种失败类别及其传播策略。

use crate::core::models::PluginKind;

/// Errors produced by the suite execution engine.
/// 套件执行引擎产生的错误。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An identifier is already taken for this capability kind.
    #[error("{kind} plugin identifier '{identifier}' is already registered")]
    DuplicateIdentifier { kind: PluginKind, identifier: String },

    /// No plugin of this kind is registered under the identifier.
    #[error("no {kind} plugin registered under '{identifier}'")]
    PluginNotFound { kind: PluginKind, identifier: String },

    /// No parser plugin handles the requested format.
    #[error("unsupported configuration format '{format}'")]
    UnsupportedFormat { format: String },

    /// The parser located for the format failed to decode the input.
    #[error("failed to parse {format} configuration: {source}")]
    ParseError {
        format: String,
        #[source]
        source: anyhow::Error,
    },

    /// The configuration is structurally invalid (wrong shape, ambiguous groups, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A test could not be executed at all.
    #[error("unrecoverable error while executing test '{test}': {source}")]
    Execution {
        test: String,
        #[source]
        source: anyhow::Error,
    },

    /// A reporter failed to produce its output.
    #[error("reporter '{reporter}' failed: {source}")]
    Reporter {
        reporter: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wraps a plugin-side failure while executing `test`.
    pub fn execution(test: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::Execution {
            test: test.into(),
            source: source.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
