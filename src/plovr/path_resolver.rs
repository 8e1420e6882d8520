//! `@Bundle/...` aliases and `%name%` placeholders in path expressions.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::ResolutionError;
use crate::services::{
    BundleLocator,
    ParameterResolver,
    resolve_string,
};

/// Turns path expressions from a plovr config into filesystem paths.
#[derive(Clone, Copy)]
pub struct PathResolver<'a> {
    bundles: &'a dyn BundleLocator,
    parameters: &'a dyn ParameterResolver,
}

impl std::fmt::Debug for PathResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver").finish_non_exhaustive()
    }
}

impl<'a> PathResolver<'a> {
    #[must_use]
    pub fn new(bundles: &'a dyn BundleLocator, parameters: &'a dyn ParameterResolver) -> Self {
        Self { bundles, parameters }
    }

    #[must_use]
    pub fn parameters(&self) -> &'a dyn ParameterResolver {
        self.parameters
    }

    /// Resolves the bundle alias, then the parameter placeholders.
    ///
    /// `@AcmeBundle/Resources/js` becomes `<AcmeBundle dir>/Resources/js`; a
    /// bare `@AcmeBundle` becomes the bundle directory. Anything else is taken
    /// literally before placeholder substitution.
    pub fn resolve(&self, path_expr: &str) -> Result<String, ResolutionError> {
        let aliased = self.resolve_alias(path_expr)?;
        let resolved = scalar_to_string(resolve_string(&aliased, self.parameters)?, path_expr)?;

        if resolved != path_expr {
            tracing::debug!(from = path_expr, to = %resolved, "Resolved path");
        }
        Ok(resolved)
    }

    /// Resolves a bundle alias only.
    pub fn resolve_alias(&self, path_expr: &str) -> Result<String, ResolutionError> {
        let Some(alias) = path_expr.strip_prefix('@') else {
            return Ok(path_expr.to_string());
        };

        let (bundle, sub_path) = alias.split_once('/').unwrap_or((alias, ""));
        // An absolute sub-path would replace the bundle directory on push.
        let sub_path = sub_path.trim_start_matches('/');
        let mut path: PathBuf = self.bundles.bundle_path(bundle)?;
        if !sub_path.is_empty() {
            path.push(sub_path);
        }

        Ok(path.to_string_lossy().into_owned())
    }
}

/// Placeholders that stand alone may yield non-string parameters; a path needs
/// a scalar.
pub(crate) fn scalar_to_string(value: Value, template: &str) -> Result<String, ResolutionError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        Value::Array(_) | Value::Object(_) => Err(ResolutionError::NonScalarParameter {
            name: template.trim_matches('%').to_string(),
            template: template.to_string(),
        }),
    }
}
