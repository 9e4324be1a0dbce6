use std::fmt;

use crate::session_management::SessionId;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    DirectoryDoesNotExist(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::DirectoryDoesNotExist(e) => write!(f, "Directory error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Low-level failures of the SQLite backend.
#[derive(Debug)]
pub enum StorageError {
    ConnectionFailed,
    WriteFailed,
    ReadFailed,
    Timeout,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed => write!(f, "Storage connection failed"),
            StorageError::WriteFailed => write!(f, "Storage write failed"),
            StorageError::ReadFailed => write!(f, "Storage read failed"),
            StorageError::Timeout => write!(f, "Storage operation timed out"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Outcome taxonomy shared by every store operation.
///
/// Variants:
/// - `NotFound`: the referenced session/user/profile does not exist.
/// - `InvalidState`: the operation is illegal for the entity's current state
///   (for example completing an already completed session).
/// - `Validation`: a value is outside its documented domain.
/// - `InvalidSession`: a telemetry write targeted a session that is not active.
/// - `StorageUnavailable`: the underlying connection/transaction failed; the
///   only variant a caller should consider retrying.
#[derive(Debug)]
pub enum CoreError {
    NotFound,
    InvalidState(String),
    Validation(String),
    InvalidSession(SessionId),
    StorageUnavailable(StorageError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::NotFound => write!(f, "Record not found"),
            CoreError::InvalidState(e) => write!(f, "Invalid state: {}", e),
            CoreError::Validation(e) => write!(f, "Validation error: {}", e),
            CoreError::InvalidSession(id) => write!(f, "Session {} is not active", id),
            CoreError::StorageUnavailable(e) => write!(f, "Storage unavailable: {}", e),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::StorageUnavailable(err)
    }
}
