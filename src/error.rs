//! Error types for xmlschema-codegen
//!
//! This module defines all error types used throughout the library.
//! Configuration, contract and circularity errors abort a run; template
//! lookup and compilation problems are handled (logged and skipped) in
//! the render loop and never surface through this type.

use thiserror::Error;

/// Result type alias using the xmlschema-codegen Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for code generation operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generator or type-map configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller-contract violation (wrong kind of object passed in)
    #[error("type error: {0}")]
    Type(String),

    /// Invalid XML name
    #[error("name error: {0}")]
    Name(String),

    /// Circular dependency between complex types
    #[error("circularity found between {0}")]
    Circularity(String),

    /// Schema reading/building error
    #[error("schema error: {0}")]
    Schema(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Template rendering error
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
