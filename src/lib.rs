//! plovr-bridge
//!
//! Bridge to plovr, the Closure JavaScript build tool.
//! Resolves paths and parameters in build configs and runs plovr once per locale.

pub mod cli;
pub mod commands;
pub mod error;
pub mod plovr;
pub mod services;
pub mod settings;

mod test_utils;

pub use error::{
    Error,
    Result,
};
