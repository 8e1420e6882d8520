use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

use crate::error::{
    ValidationError,
    format_validation_errors,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Project settings validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load project settings: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse project settings: {0}")]
    Syntax(String),

    #[error("Invalid project settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Contents of `.plovr.json` at the project root.
///
/// Stands in for the application container: it tells the bridge where bundles
/// live, which parameters may be referenced as `%name%`, where the translation
/// catalogues and the route table are.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    /// Used when `--plovr-jar` is not given.
    pub plovr_jar: Option<PathBuf>,
    /// Used when `--java-bin` is not given. Falls back to a `PATH` search.
    pub java_bin: Option<PathBuf>,

    /// Bundle name → directory, for `@Name/...` aliases.
    pub bundles: BTreeMap<String, PathBuf>,
    /// Values for `%name%` placeholders.
    pub parameters: Map<String, Value>,

    pub translations: TranslationSettings,
    pub routing: RoutingSettings,
    pub extractor: ExtractorSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationSettings {
    /// Catalogue files, named `<domain>.<locale>.json`.
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    /// Locale consulted when a message is missing from the requested one.
    pub fallback_locale: Option<String>,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/translations/*.json".to_string()],
            exclude_patterns: vec!["node_modules/**".to_string()],
            fallback_locale: Some("en".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingSettings {
    /// Prefixed to every generated URL (e.g. "/app_dev.php").
    pub base_url: String,
    /// Route name → path pattern. `{_locale}` is filled from the locale context.
    pub routes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorSettings {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/*.js".to_string()],
            exclude_patterns: vec!["node_modules/**".to_string()],
        }
    }
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            plovr_jar: None,
            java_bin: None,
            bundles: BTreeMap::new(),
            parameters: Map::new(),
            translations: TranslationSettings::default(),
            routing: RoutingSettings::default(),
            extractor: ExtractorSettings::default(),
        }
    }
}

impl ProjectSettings {
    /// Makes relative tool and bundle paths absolute against `root`.
    #[must_use]
    pub fn anchored_at(mut self, root: &Path) -> Self {
        let anchor = |path: PathBuf| if path.is_relative() { root.join(path) } else { path };

        self.plovr_jar = self.plovr_jar.map(anchor);
        self.java_bin = self.java_bin.map(anchor);
        self.bundles = self.bundles.into_iter().map(|(name, dir)| (name, anchor(dir))).collect();
        self
    }

    /// # Errors
    /// - Empty tool path
    /// - Invalid bundle name
    /// - Invalid glob pattern
    /// - Route pattern not starting with '/'
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field, path) in [("plovrJar", &self.plovr_jar), ("javaBin", &self.java_bin)] {
            if let Some(path) = path
                && path.as_os_str().is_empty()
            {
                errors.push(ValidationError::new(
                    field,
                    "The path cannot be empty. Please specify a path, or remove this field",
                ));
            }
        }

        for name in self.bundles.keys() {
            if name.is_empty() || name.starts_with('@') || name.contains('/') {
                errors.push(ValidationError::new(
                    format!("bundles.{name}"),
                    "Bundle names must be non-empty and contain neither '@' prefix nor '/'. Example: \"AcmeBundle\"",
                ));
            }
        }

        validate_patterns(
            &mut errors,
            "translations.includePatterns",
            &self.translations.include_patterns,
        );
        validate_patterns(
            &mut errors,
            "translations.excludePatterns",
            &self.translations.exclude_patterns,
        );
        validate_patterns(&mut errors, "extractor.includePatterns", &self.extractor.include_patterns);
        validate_patterns(&mut errors, "extractor.excludePatterns", &self.extractor.exclude_patterns);

        if let Some(locale) = &self.translations.fallback_locale
            && locale.is_empty()
        {
            errors.push(ValidationError::new(
                "translations.fallbackLocale",
                "The locale cannot be empty. Please specify a locale (e.g., \"en\"), or remove this field",
            ));
        }

        for (name, pattern) in &self.routing.routes {
            if !pattern.starts_with('/') {
                errors.push(ValidationError::new(
                    format!("routing.routes.{name}"),
                    format!("Route pattern '{pattern}' must start with '/'"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn validate_patterns(errors: &mut Vec<ValidationError>, field: &str, patterns: &[String]) {
    for (index, pattern) in patterns.iter().enumerate() {
        if let Err(e) = globset::Glob::new(pattern) {
            errors.push(ValidationError::new(
                format!("{field}[{index}]"),
                format!("Invalid glob pattern '{pattern}': {e}"),
            ));
        }
    }
}
