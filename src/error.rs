//! Error types for rust-edmgen
//!
//! Malformed schema data never surfaces here: it is reported as
//! [`crate::model::EdmSchemaError`] diagnostics. These errors cover I/O,
//! configuration and caller contract violations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a generation pass before or outside model building
#[derive(Error, Debug)]
pub enum EdmGenError {
    #[error("Failed to read settings file: {path}")]
    SettingsReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file: {path}")]
    SettingsParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read schema file: {path}")]
    SchemaReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema file: {path}")]
    SchemaParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write report to {path}")]
    ReportWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown target schema version: {value}")]
    UnknownTargetVersion { value: String },

    #[error("Unsupported provider: {invariant_name}")]
    UnsupportedProvider { invariant_name: String },

    #[error("Unsupported provider manifest token '{token}' for {invariant_name}")]
    UnsupportedManifestToken {
        invariant_name: String,
        token: String,
    },

    #[error("Identifier '{name}' is already registered")]
    IdentifierAlreadyRegistered { name: String },

    #[error("Cannot build {object} from an empty row group")]
    EmptyRowGroup { object: &'static str },

    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidFilterPattern { pattern: String, message: String },
}

