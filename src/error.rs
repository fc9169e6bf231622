//! Application error with a process exit code.
//!
//! Exit codes:
//! - `2`: input files missing or malformed
//! - `3`: no usable data after filtering
//! - `4`: numeric failure (rounding zero, fit failure, interpolation out of range)
//! - `5`: rendering or writing an output artifact

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

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(5, message)
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
