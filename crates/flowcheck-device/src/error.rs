//! Error types for switch CLI access.

use thiserror::Error;

/// Errors raised while querying a switch.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The CLI session could not be established or broke mid-command.
    #[error("session with switch {switch} failed: {message}")]
    Session {
        /// Configured switch name.
        switch: String,
        /// What went wrong, in transport terms.
        message: String,
    },

    /// The switch model has no command answering this query.
    #[error("{operation} is not implemented by switch {switch}")]
    Unsupported {
        /// Configured switch name.
        switch: String,
        /// The query that was asked for.
        operation: String,
    },
}

impl DeviceError {
    /// Creates a session error.
    pub fn session(switch: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceError::Session {
            switch: switch.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(switch: impl Into<String>, operation: impl Into<String>) -> Self {
        DeviceError::Unsupported {
            switch: switch.into(),
            operation: operation.into(),
        }
    }

    /// True for errors meaning "this model cannot answer", as opposed
    /// to a transport failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DeviceError::Unsupported { .. })
    }
}

/// Convenience alias for device query results.
pub type DeviceResult<T> = Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let err = DeviceError::session("s1", "connection refused");
        assert_eq!(
            err.to_string(),
            "session with switch s1 failed: connection refused"
        );

        let err = DeviceError::unsupported("s1", "flow listing");
        assert_eq!(err.to_string(), "flow listing is not implemented by switch s1");
        assert!(err.is_unsupported());
    }
}
