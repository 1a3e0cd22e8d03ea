//! Persistence and counter store error types.

/// Store error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// The store could not be reached
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
    /// Query execution failed
    #[display("Store query error: {}", _0)]
    Query(String),
    /// Record not found
    #[display("Record not found")]
    NotFound,
    /// Uniqueness constraint violated
    #[display("Conflict: {}", _0)]
    Conflict(String),
    /// Stored value could not be decoded
    #[display("Serialization error: {}", _0)]
    Serialization(String),
}

/// Store error with source location tracking.
///
/// # Examples
///
/// ```
/// use qrgate_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::NotFound);
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new StoreError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoreErrorKind {
        &self.kind
    }

    /// Whether this error means the record does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// Diesel error conversions (only available with database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::NotFound => StoreError::new(StoreErrorKind::NotFound),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::new(StoreErrorKind::Conflict(info.message().to_string()))
            }
            Error::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                StoreError::new(StoreErrorKind::Unavailable(info.message().to_string()))
            }
            Error::DeserializationError(e) => {
                StoreError::new(StoreErrorKind::Serialization(e.to_string()))
            }
            _ => StoreError::new(StoreErrorKind::Query(err.to_string())),
        }
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for StoreError {
    fn from(err: diesel::ConnectionError) -> Self {
        StoreError::new(StoreErrorKind::Unavailable(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::new(StoreErrorKind::Unavailable(err.to_string()))
    }
}
