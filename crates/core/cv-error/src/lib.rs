//! Error types and classification for the Cal/Val catalog builder.
//!
//! This crate provides:
//! - [`CvError`] - Top-level error enum for all catalog operations
//! - Domain-specific errors ([`ListingError`], [`FetchError`], [`CatalogError`])
//! - [`ErrorCategory`] telling an operator whether re-running may succeed

use thiserror::Error;

/// Top-level error type for the catalog builder.
#[derive(Error, Debug)]
pub enum CvError {
    /// Object listing errors (pagination, malformed keys)
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Geometry fetch errors (object access, decoding)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Catalog and seed table errors (read, parse, write)
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Listing-related errors.
#[derive(Error, Debug)]
pub enum ListingError {
    /// A page request failed
    #[error("Request failed: {0}")]
    Request(String),

    /// A listed key does not carry the expected path structure
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Geometry fetch errors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),

    /// URL could not be split into bucket and key
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O error while reading the object
    #[error("I/O error: {0}")]
    Io(String),

    /// No decodable geometry in the object
    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Catalog table errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Reading a table failed
    #[error("Read failed: {0}")]
    Read(String),

    /// A row could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required column is missing
    #[error("Schema error: {0}")]
    Schema(String),

    /// Writing a table failed
    #[error("Write failed: {0}")]
    Write(String),
}

/// Error classification for recovery decisions.
///
/// The only recovery path is re-running the whole build, so this tells the
/// operator whether a re-run can be expected to help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - re-running may succeed
    ///
    /// Examples: listing timeout, dropped connection while reading an object
    Transient,

    /// Permanent error - fix the input or configuration first
    ///
    /// Examples: missing seed file, malformed catalog row, undecodable object
    Permanent,
}

/// Classifies an error to determine whether a re-run may succeed.
pub fn classify_error(error: &CvError) -> ErrorCategory {
    match error {
        CvError::Listing(e) => classify_listing_error(e),
        CvError::Fetch(e) => classify_fetch_error(e),
        CvError::Catalog(e) => classify_catalog_error(e),
        CvError::Config(_) => ErrorCategory::Permanent,
        CvError::Other(e) => classify_anyhow_error(e),
    }
}

fn classify_listing_error(error: &ListingError) -> ErrorCategory {
    match error {
        ListingError::Request(msg) => classify_message(msg),
        ListingError::InvalidKey(_) => ErrorCategory::Permanent,
    }
}

fn classify_fetch_error(error: &FetchError) -> ErrorCategory {
    match error {
        FetchError::NotFound(_) => ErrorCategory::Permanent,
        FetchError::InvalidUrl(_) => ErrorCategory::Permanent,
        FetchError::Io(msg) => classify_message(msg),
        FetchError::Decode(_) => ErrorCategory::Permanent,
    }
}

fn classify_catalog_error(error: &CatalogError) -> ErrorCategory {
    match error {
        CatalogError::Read(_) => ErrorCategory::Transient,
        CatalogError::Parse(_) => ErrorCategory::Permanent,
        CatalogError::Schema(_) => ErrorCategory::Permanent,
        CatalogError::Write(_) => ErrorCategory::Transient,
    }
}

fn classify_anyhow_error(error: &anyhow::Error) -> ErrorCategory {
    classify_message(&error.to_string())
}

/// S3 errors surface as strings; access and existence failures will not
/// resolve themselves, anything else is assumed to be network trouble.
fn classify_message(msg: &str) -> ErrorCategory {
    let msg = msg.to_lowercase();

    if msg.contains("nosuchbucket")
        || msg.contains("nosuchkey")
        || msg.contains("accessdenied")
        || msg.contains("invalidaccesskeyid")
        || msg.contains("403")
        || msg.contains("404")
    {
        ErrorCategory::Permanent
    } else {
        ErrorCategory::Transient
    }
}

/// Result type alias using CvError.
pub type Result<T> = std::result::Result<T, CvError>;
