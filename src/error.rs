use std::str::Utf8Error;

/// When things go awry.
#[derive(Debug)]
pub enum GoatnsCoreError {
    /// A decode-time fault: bad label length, reserved label-type bits,
    /// out-of-range or looping pointer, truncated record data.
    InvalidName,
    InvalidHeader(String),
    IoError(std::io::Error),
    /// Something failed in the start up of the platform.
    StartupError(String),
    FileError(String),
    EmptyFile,
    Utf8Error(Utf8Error),
    Generic(String),
    InvalidValue(String),
}

impl From<std::io::Error> for GoatnsCoreError {
    fn from(error: std::io::Error) -> Self {
        GoatnsCoreError::IoError(error)
    }
}

impl From<Utf8Error> for GoatnsCoreError {
    fn from(error: Utf8Error) -> Self {
        GoatnsCoreError::Utf8Error(error)
    }
}

impl From<serde_json::Error> for GoatnsCoreError {
    fn from(error: serde_json::Error) -> Self {
        GoatnsCoreError::FileError(error.to_string())
    }
}

impl From<GoatnsCoreError> for std::io::Error {
    fn from(error: GoatnsCoreError) -> Self {
        match error {
            GoatnsCoreError::IoError(err) => err,
            GoatnsCoreError::StartupError(err) => std::io::Error::other(err),
            GoatnsCoreError::FileError(err) => std::io::Error::other(err),
            GoatnsCoreError::EmptyFile => std::io::Error::other("Empty file"),
            _ => std::io::Error::other(format!("{:?}", error)),
        }
    }
}

impl std::fmt::Display for GoatnsCoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for GoatnsCoreError {}
