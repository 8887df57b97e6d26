/// Convenience result type used across Nether.
pub type NetherResult<T> = Result<T, NetherError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Intermediate layers only add context; every variant surfaces unchanged to the binary, which
/// maps it to a category-specific message and exit status via [`NetherError::exit_code`].
#[derive(thiserror::Error, Debug)]
pub enum NetherError {
    /// Invalid pipeline configuration, detected before any rendering starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A numeric operation was asked to do something undefined (e.g. divide by zero).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Filesystem failure, with the path and (when known) the frame index in `context`.
    #[error("io error: {context}: {source}")]
    Io {
        /// Human-readable description of what was being attempted.
        context: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Cooperative cancellation was observed; frames from `next_index` on were not rendered.
    #[error("interrupted: rendering stopped before frame {next_index}")]
    Interrupted {
        /// Lowest frame index that was not rendered.
        next_index: u64,
    },

    /// The external encoder could not be started or exited unsuccessfully.
    #[error("encoder error: {message}{}", fmt_exit_code(.code))]
    Encoder {
        /// Process exit code, `None` if the process never started or was killed by a signal.
        code: Option<i32>,
        /// Summary of the failure.
        message: String,
    },

    /// Wrapped lower-level error outside the taxonomy above.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" (exit code {c})"),
        None => String::new(),
    }
}

impl NetherError {
    /// Build a [`NetherError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`NetherError::InvalidOperation`] value.
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Build a [`NetherError::Io`] value.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build a [`NetherError::Encoder`] value.
    pub fn encoder(code: Option<i32>, msg: impl Into<String>) -> Self {
        Self::Encoder {
            code,
            message: msg.into(),
        }
    }

    /// Process exit status for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::Io { .. } => 3,
            Self::Encoder { .. } => 4,
            Self::Interrupted { .. } => 130,
            Self::InvalidOperation(_) | Self::Other(_) => 1,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
