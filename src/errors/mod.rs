use std::fmt::{self, Display};
use thiserror::Error;

/// Malformed input to the codec or one of the expression builders.
///
/// These are programmer errors: they are raised before anything is sent to DynamoDB
/// and retrying the same call will fail the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Attribute names must not be empty")]
    EmptyAttributeName,
    #[error("Invalid attribute name: '{0}' (only ASCII letters, digits and '_' are allowed)")]
    InvalidAttributeName(String),
    #[error("Placeholder {placeholder} is claimed by both '{first}' and '{second}'")]
    PlaceholderCollision {
        placeholder: String,
        first: String,
        second: String,
    },
    #[error("Attribute '{0}' is managed by crudop and cannot be set directly")]
    ReservedAttribute(String),
    #[error("Invalid key condition operator: '{0}'")]
    InvalidOperator(String),
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),
    #[error("Unsupported attribute value: {0}")]
    UnsupportedAttributeValue(String),
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),
    #[error("Failed to convert attribute value to {0}")]
    ConversionFailed(String),
}

/// The DynamoDB call a [`StorageError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PutItem,
    GetItem,
    UpdateItem,
    DeleteItem,
    Scan,
    Query,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PutItem => "PutItem",
            Self::GetItem => "GetItem",
            Self::UpdateItem => "UpdateItem",
            Self::DeleteItem => "DeleteItem",
            Self::Scan => "Scan",
            Self::Query => "Query",
        })
    }
}

/// Coarse classification of a storage failure, enough for a caller to pick a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    TableNotFound,
    ConditionalCheckFailed,
    Throttled,
    Service,
    Transport,
}

impl Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TableNotFound => "table not found",
            Self::ConditionalCheckFailed => "conditional check failed",
            Self::Throttled => "throttled",
            Self::Service => "service error",
            Self::Transport => "transport error",
        })
    }
}

/// Any failure reported by the storage backend.
///
/// Never retried by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{operation} on table '{table}'{} failed ({kind}): {message}",
    .key.as_ref().map(|key| format!(" for key [{key}]")).unwrap_or_default()
)]
pub struct StorageError {
    pub operation: Operation,
    pub kind: StorageErrorKind,
    pub table: String,
    pub key: Option<String>,
    pub message: String,
}

impl StorageError {
    pub fn new(
        operation: Operation,
        kind: StorageErrorKind,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            table: table.into(),
            key: None,
            message: message.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            StorageErrorKind::Throttled | StorageErrorKind::Transport
        )
    }
}

/// Error returned by [`Table::put`](crate::Table::put) when encoding and writing an item
#[derive(Error, Debug)]
pub enum PutError {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

/// Error returned by [`Table::get`](crate::Table::get) when reading and decoding an item
#[derive(Error, Debug)]
pub enum GetError {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

/// Error returned by [`Table::update`](crate::Table::update)
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

/// Error returned by [`Table::delete`](crate::Table::delete)
#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

/// Error returned by [`Table::scan`](crate::Table::scan) and [`Table::scan_all`](crate::Table::scan_all)
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

/// Error returned by [`Table::query`](crate::Table::query) when building the key condition,
/// querying and decoding the results
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

/// Error returned when resolving client or table configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Incomplete credentials: {0} is set but {1} is not")]
    IncompleteCredentials(&'static str, &'static str),
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Error abstracting all errors returned by `crudop`.
///
/// If you use this error you can use `?` to convert from the other `crudop` errors to
/// this one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("ConfigError: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("ValidationError: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("PutError: {0}")]
    PutError(#[from] PutError),
    #[error("GetError: {0}")]
    GetError(#[from] GetError),
    #[error("UpdateError: {0}")]
    UpdateError(#[from] UpdateError),
    #[error("DeleteError: {0}")]
    DeleteError(#[from] DeleteError),
    #[error("ScanError: {0}")]
    ScanError(#[from] ScanError),
    #[error("QueryError: {0}")]
    QueryError(#[from] QueryError),
}

impl Error {
    /// The underlying storage failure, if this error came from DynamoDB.
    pub fn storage(&self) -> Option<&StorageError> {
        match self {
            Self::PutError(PutError::Storage(e))
            | Self::GetError(GetError::Storage(e))
            | Self::UpdateError(UpdateError::Storage(e))
            | Self::DeleteError(DeleteError::Storage(e))
            | Self::ScanError(ScanError::Storage(e))
            | Self::QueryError(QueryError::Storage(e)) => Some(e),
            _ => None,
        }
    }
}
