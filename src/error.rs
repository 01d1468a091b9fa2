use thiserror::Error;

/// Application-level failure: a message for the terminal plus the process exit code.
///
/// Exit codes: `2` for usage, configuration and file errors, `4` for data,
/// network and terminal errors.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Per-record failures raised by the NAV engine.
///
/// These are local to the offending record: callers skip the record and keep
/// processing the rest of the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// The date text is not `DD-MM-YYYY` or names a day that does not exist.
    #[error("Malformed date '{input}': expected DD-MM-YYYY")]
    MalformedDate { input: String },

    /// The NAV value is not a finite decimal in `0..=MAX_NAV`.
    #[error("Invalid NAV '{value}' on {date}")]
    InvalidNav { date: String, value: String },
}

impl From<NavError> for AppError {
    fn from(err: NavError) -> Self {
        AppError::new(4, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_error_maps_to_data_exit_code() {
        let err: AppError = NavError::MalformedDate {
            input: "2024-03-01".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.message(), "Malformed date '2024-03-01': expected DD-MM-YYYY");
    }
}
