/*!
 * Error types for the sheetwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body onto the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors raised while probing or writing one text representation of a shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeTextError {
    /// The shape does not carry this representation at all
    #[error("representation not present on shape")]
    Absent,

    /// The representation exists but holds no text
    #[error("representation holds no text")]
    NoText,

    /// The backend cannot read or write this representation
    #[error("representation not supported: {0}")]
    Unsupported(String),

    /// The host refused the write
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Errors raised by the spreadsheet object model
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// The host application could not be started
    #[error("Failed to start spreadsheet host: {0}")]
    Launch(String),

    /// The workbook could not be opened
    #[error("Failed to open workbook {path:?}: {message}")]
    Open {
        path: PathBuf,
        message: String,
    },

    /// The workbook could not be saved
    #[error("Failed to save workbook to {path:?}: {message}")]
    Save {
        path: PathBuf,
        message: String,
    },

    /// No sheet at the given position
    #[error("Sheet {0} not found")]
    SheetNotFound(usize),

    /// No shape at the given 1-based index
    #[error("Shape {index} not found on sheet '{sheet}'")]
    ShapeNotFound {
        sheet: String,
        index: usize,
    },

    /// Cell address could not be parsed or resolved
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// A cell write was refused
    #[error("Cannot write cell {address} on sheet '{sheet}': {message}")]
    CellWrite {
        sheet: String,
        address: String,
        message: String,
    },

    /// Malformed package or part
    #[error("Package error: {0}")]
    Package(String),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP container error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Underlying IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::events::attributes::AttrError> for WorkbookError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(quick_xml::Error::from(error))
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Pre-flight requirement missing (configuration, API key)
    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    /// Input directory does not exist
    #[error("Directory does not exist or is not a directory: {0:?}")]
    DirectoryMissing(PathBuf),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the spreadsheet object model
    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
