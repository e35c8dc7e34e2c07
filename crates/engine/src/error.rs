//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`NotFound`] thrown when a referenced item, warehouse, entry or closed
//!   date does not exist.
//! - [`InvalidRequest`] thrown for missing mandatory fields and malformed
//!   numbers, dates or ranges.
//! - [`InsufficientStock`] thrown when an OUT movement asks for more than
//!   the stock level holds.
//! - [`Conflict`] thrown when a unique key is taken or a row is still in use.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvalidRequest`]: EngineError::InvalidRequest
//!  [`InsufficientStock`]: EngineError::InsufficientStock
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidRequest(a), Self::InvalidRequest(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
