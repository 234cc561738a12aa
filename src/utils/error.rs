// src/utils/error.rs
use thiserror::Error;

// Errors from the hosted data API that supplies export documents
#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("Request rejected, check the API key")]
    Unauthorized, // 401 / 403

    #[error("Table endpoint not found: {0}")]
    NotFound(String),

    #[error("Failed to parse Supabase response: {0}")]
    Parse(String),
}

// Errors raised when an extracted header + rows block is read as a typed table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Malformed row {row}: expected {expected} fields, found {found}")]
    MalformedRow {
        row: usize, // 1-based data row, blank lines not counted
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {0}")]
    Csv(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Supabase interaction failed: {0}")]
    Supabase(#[from] SupabaseError),

    #[error("Table parsing failed: {0}")]
    Table(#[from] TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
