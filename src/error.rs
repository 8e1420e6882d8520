//! Error types shared across the build workflow.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::settings::{
    MatcherError,
    SettingsError,
};

/// A single problem found while validating a JSON document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "paths[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

pub(crate) fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Missing or malformed keys in a plovr build configuration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("You must specify \"output-file\" in your plovr configuration file.")]
    MissingOutputFile,

    #[error("Invalid plovr configuration \"{}\": {reason}", .path.display())]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("Invalid plovr configuration:\n{}", format_validation_errors(.0))]
    InvalidShape(Vec<ValidationError>),

    #[error("Failed to decode plovr configuration: {0}")]
    Decode(#[from] serde_json::Error),

    /// `MSG_` and `ROUTE_` defines must hold a message id or route name.
    #[error("define \"{key}\" must be a string, got {value}")]
    InvalidDefine { key: String, value: serde_json::Value },
}

/// A bundle, parameter or route that the collaborating services do not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Bundle \"{name}\" does not exist or is not registered.")]
    UnknownBundle { name: String },

    #[error("You have requested a non-existent parameter \"{name}\".")]
    UnknownParameter { name: String },

    #[error("Parameter \"{name}\" cannot be embedded in \"{template}\": it is not a scalar value.")]
    NonScalarParameter { name: String, template: String },

    #[error("Circular reference detected for parameter \"{name}\".")]
    CircularParameter { name: String },

    #[error("Route \"{name}\" does not exist.")]
    UnknownRoute { name: String },

    #[error("Route \"{name}\" requires a locale but no locale context is set.")]
    MissingLocaleContext { name: String },
}

/// Missing tools, unreadable inputs and unwritable outputs.
#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("Unable to find Java executable.")]
    JavaNotFound,

    #[error("Java binary \"{}\" does not exist, or cannot be executed.", .path.display())]
    JavaNotExecutable { path: PathBuf },

    #[error("No plovr jar configured. Pass --plovr-jar or set \"plovrJar\" in .plovr.json.")]
    JarNotConfigured,

    #[error("The plovr jar \"{}\" does not exist, or is not readable.", .path.display())]
    JarNotReadable { path: PathBuf },

    #[error("Plovr configuration file \"{}\" does not exist, or is not readable.", .path.display())]
    ConfigNotReadable { path: PathBuf },

    #[error("Failed to create directory \"{}\": {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output path \"{}\" is not writable.", .path.display())]
    NotWritable { path: PathBuf },

    #[error("Failed to create output file \"{}\": {source}", .path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write temporary configuration: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to read \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The child process could not be started.
#[derive(Error, Debug)]
#[error("Failed to launch \"{command}\": {source}")]
pub struct ProcessLaunchError {
    pub command: String,
    #[source]
    pub source: std::io::Error,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    #[error(transparent)]
    ProcessLaunch(#[from] ProcessLaunchError),

    #[error("plovr {verb} exited with {status}")]
    ToolFailed { verb: String, status: ExitStatus },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
