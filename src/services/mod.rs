//! Collaborators the build workflow calls into.
//!
//! The planner, normalizer and runner only see these traits; the file-backed
//! implementations next to them are what the command line wires in.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::ResolutionError;

mod bundles;
mod parameters;
mod routing;
mod sink;
mod translation;

pub use bundles::BundleRegistry;
pub use parameters::{
    ParameterBag,
    resolve_string,
};
pub use routing::RouteTable;
pub use sink::{
    ConsoleSink,
    MemorySink,
};
pub use translation::{
    TranslationCatalogue,
    flatten_catalogue,
};

/// Locates bundle directories for `@Name/...` aliases.
pub trait BundleLocator {
    fn bundle_path(&self, name: &str) -> Result<PathBuf, ResolutionError>;
}

/// Looks up `%name%` parameters.
pub trait ParameterResolver {
    fn resolve_parameter(&self, name: &str) -> Result<Value, ResolutionError>;

    /// Substitutes placeholders in every string nested inside `value`.
    fn resolve_value(&self, value: &Value) -> Result<Value, ResolutionError> {
        match value {
            Value::String(raw) => resolve_string(raw, self),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item))
                .collect::<Result<_, _>>()
                .map(Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.resolve_value(item)?)))
                .collect::<Result<_, _>>()
                .map(Value::Object),
            _ => Ok(value.clone()),
        }
    }
}

/// Translates message ids.
pub trait Translator {
    /// Returns `id` itself when no translation exists.
    fn translate(&self, id: &str, locale: &str, domain: &str) -> String;
}

/// Generates URLs for named routes.
pub trait Router {
    fn set_locale_context(&mut self, locale: &str);

    fn generate_url(&self, route: &str) -> Result<String, ResolutionError>;
}

/// Receives the console stream: tool output and progress lines.
pub trait OutputSink: Send + Sync {
    fn write_line(&self, line: &str);
}
