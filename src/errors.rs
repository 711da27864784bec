use std::error;
use std::fmt;

use aws_sdk_dynamodb::types::SdkError;

/// Error raised by the session store.
#[derive(Debug)]
pub struct Error {
    details: String,
}

impl Error {
    pub fn new(msg: &str) -> Error {
        Error {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl std::error::Error for Error {
    fn description(&self) -> &str {
        &self.details
    }
}

impl<E> From<SdkError<E>> for Error
where
    E: error::Error,
{
    fn from(value: SdkError<E>) -> Error {
        Error {
            details: format!("{}", value),
        }
    }
}

/// Error raised when invoking another Lambda function fails, either at the
/// transport layer or because its response could not be decoded.
#[derive(Debug)]
pub struct InvocationError {
    pub status_code: u16,
    pub message: String,
}

impl InvocationError {
    pub fn new(status_code: u16, message: impl Into<String>) -> InvocationError {
        InvocationError {
            status_code,
            message: message.into(),
        }
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.status_code, self.message)
    }
}

impl error::Error for InvocationError {}

/// Error raised when a remote authorization check denies the caller.
#[derive(Debug)]
pub struct AuthorizationError {
    pub status_code: u16,
    pub message: String,
}

impl AuthorizationError {
    pub fn new(status_code: u16, message: impl Into<String>) -> AuthorizationError {
        AuthorizationError {
            status_code,
            message: message.into(),
        }
    }
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.status_code, self.message)
    }
}

impl error::Error for AuthorizationError {}
