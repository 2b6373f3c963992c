/// Usage errors and unreadable or unsupported input.
pub const EXIT_USAGE: u8 = 2;
/// Nothing to interpolate from.
pub const EXIT_EMPTY: u8 = 3;
/// Grid file or interpolation engine failures.
pub const EXIT_IO: u8 = 4;

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

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
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

impl From<crate::data::BinError> for AppError {
    fn from(err: crate::data::BinError) -> Self {
        AppError::usage(format!("Bin database error: {err}"))
    }
}

impl From<crate::io::GridError> for AppError {
    fn from(err: crate::io::GridError) -> Self {
        AppError::io(format!("Grid file error: {err}"))
    }
}

impl From<crate::fill::EngineError> for AppError {
    fn from(err: crate::fill::EngineError) -> Self {
        AppError::io(format!("Interpolation engine error: {err}"))
    }
}
