//! Canonicalizes a raw plovr config.

use std::path::Path;

use super::build_config::BuildConfig;
use super::output_dir::ensure_parent_dir;
use super::path_resolver::{
    PathResolver,
    scalar_to_string,
};
use super::planner::LOCALE_TOKEN;
use crate::error::Result;
use crate::services::resolve_string;

/// Resolves every path and placeholder a plovr config may contain.
#[derive(Debug, Clone, Copy)]
pub struct ConfigNormalizer<'a> {
    paths: PathResolver<'a>,
}

impl<'a> ConfigNormalizer<'a> {
    #[must_use]
    pub const fn new(paths: PathResolver<'a>) -> Self {
        Self { paths }
    }

    /// Returns the canonical form of `raw`.
    ///
    /// - `paths`, `inputs`, `externs`: each entry resolved through [`PathResolver`].
    /// - `define`, `locales`: nested `%name%` placeholders resolved.
    /// - `output-file` and the map files: resolved; output map directories are
    ///   created unless the path is locale-specific.
    ///
    /// Normalizing a normalized config changes nothing.
    ///
    /// # Errors
    /// - Unknown bundle or parameter
    /// - Output map directory cannot be created
    pub fn normalize(&self, raw: BuildConfig) -> Result<BuildConfig> {
        let mut config = raw;
        let parameters = self.paths.parameters();

        for list in [&mut config.paths, &mut config.inputs, &mut config.externs].into_iter().flatten()
        {
            for entry in list.iter_mut() {
                *entry = self.paths.resolve(entry)?;
            }
        }

        if let Some(define) = config.define.as_mut() {
            for value in define.values_mut() {
                *value = parameters.resolve_value(value)?;
            }
        }

        if let Some(locales) = config.locales.as_mut() {
            for locale in locales.iter_mut() {
                *locale = scalar_to_string(resolve_string(locale, parameters)?, locale)?;
            }
        }

        for file in [
            &mut config.output_file,
            &mut config.variable_map_input_file,
            &mut config.property_map_input_file,
        ]
        .into_iter()
        .flatten()
        {
            *file = self.paths.resolve(file)?;
        }

        for file in [&mut config.variable_map_output_file, &mut config.property_map_output_file]
            .into_iter()
            .flatten()
        {
            *file = self.paths.resolve(file)?;
            // Locale-specific directories are prepared per locale by the planner.
            if !file.contains(LOCALE_TOKEN) {
                ensure_parent_dir(Path::new(file), None)?;
            }
        }

        Ok(config)
    }
}
