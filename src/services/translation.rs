//! JSON translation catalogues.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::Translator;
use crate::settings::FileMatcher;

/// Domain used when a catalogue file name carries only a locale (`fr.json`).
const DEFAULT_DOMAIN: &str = "messages";

/// Turns a nested catalogue into `(id, message)` pairs.
///
/// Nested keys are joined with `.`, so `{"hello": {"key": "Hi"}}` yields the
/// id `hello.key`. Numbers and booleans are kept as their JSON text; `null`
/// entries are skipped.
///
/// ```
/// use serde_json::json;
/// use plovr_bridge::services::flatten_catalogue;
///
/// let messages = flatten_catalogue(&json!({"hello": {"key": "Bonjour"}}));
/// assert_eq!(messages, vec![("hello.key".to_string(), "Bonjour".to_string())]);
/// ```
#[must_use]
pub fn flatten_catalogue(catalogue: &Value) -> Vec<(String, String)> {
    let mut messages = Vec::new();
    collect_messages(catalogue, None, &mut messages);
    messages
}

fn collect_messages(value: &Value, id: Option<&str>, messages: &mut Vec<(String, String)>) {
    let child_id = |key: &str| id.map_or_else(|| key.to_string(), |parent| format!("{parent}.{key}"));

    match (value, id) {
        (Value::Object(map), _) => {
            for (key, child) in map {
                collect_messages(child, Some(&child_id(key)), messages);
            }
        }
        (Value::Array(items), _) => {
            for (index, child) in items.iter().enumerate() {
                collect_messages(child, Some(&child_id(&index.to_string())), messages);
            }
        }
        (Value::Null, _) | (_, None) => {}
        (Value::String(message), Some(id)) => messages.push((id.to_string(), message.clone())),
        (other, Some(id)) => messages.push((id.to_string(), other.to_string())),
    }
}

/// Detect domain and locale from a catalogue file name.
///
/// # Examples
/// - `translations/messages.fr.json` → `("messages", "fr")`
/// - `translations/validators.pt_BR.json` → `("validators", "pt_BR")`
/// - `translations/de.json` → `("messages", "de")`
fn detect_domain_and_locale(file_path: &Path) -> Option<(String, String)> {
    let stem = file_path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }

    match stem.rsplit_once('.') {
        Some((domain, locale)) if !domain.is_empty() && !locale.is_empty() => {
            Some((domain.to_string(), locale.to_string()))
        }
        Some(_) => None,
        None => Some((DEFAULT_DOMAIN.to_string(), stem.to_string())),
    }
}

/// Language part of a regional locale (`fr_FR` and `fr-FR` → `fr`).
fn parent_locale(locale: &str) -> Option<&str> {
    locale.split_once(['_', '-']).map(|(language, _)| language).filter(|l| !l.is_empty())
}

/// Messages per (domain, locale), loaded from JSON catalogues.
#[derive(Debug, Clone, Default)]
pub struct TranslationCatalogue {
    /// (domain, locale) → flattened messages
    messages: HashMap<(String, String), HashMap<String, String>>,
    fallback_locale: Option<String>,
}

impl TranslationCatalogue {
    #[must_use]
    pub fn new(fallback_locale: Option<String>) -> Self {
        Self { messages: HashMap::new(), fallback_locale }
    }

    /// Loads every catalogue file the matcher finds.
    ///
    /// Unreadable or malformed files are skipped with a warning.
    #[must_use]
    pub fn load(matcher: &FileMatcher, fallback_locale: Option<String>) -> Self {
        let mut catalogue = Self::new(fallback_locale);

        for file in matcher.collect_files() {
            if let Err(e) = catalogue.load_file(&file) {
                tracing::warn!("Skipping translation file {:?}: {}", file, e);
            }
        }

        tracing::debug!(catalogues = catalogue.messages.len(), "Translation catalogues loaded");
        catalogue
    }

    /// Load a single catalogue file and merge its messages.
    ///
    /// # Errors
    /// Returns error if the name has no locale, or file read or JSON parse fails.
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), String> {
        let (domain, locale) = detect_domain_and_locale(file_path)
            .ok_or_else(|| "File name does not follow <domain>.<locale>.json".to_string())?;

        let content = std::fs::read_to_string(file_path)
            .map_err(|e| format!("Failed to read translation file: {e}"))?;
        let json: Value =
            serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON: {e}"))?;

        self.add_messages(&domain, &locale, flatten_catalogue(&json));
        Ok(())
    }

    pub fn add_messages(
        &mut self,
        domain: &str,
        locale: &str,
        messages: impl IntoIterator<Item = (String, String)>,
    ) {
        self.messages
            .entry((domain.to_string(), locale.to_string()))
            .or_default()
            .extend(messages);
    }

    fn lookup(&self, id: &str, locale: &str, domain: &str) -> Option<&String> {
        self.messages.get(&(domain.to_string(), locale.to_string()))?.get(id)
    }
}

impl Translator for TranslationCatalogue {
    fn translate(&self, id: &str, locale: &str, domain: &str) -> String {
        let candidates = [Some(locale), parent_locale(locale), self.fallback_locale.as_deref()];

        candidates
            .into_iter()
            .flatten()
            .find_map(|candidate| self.lookup(id, candidate, domain))
            .cloned()
            .unwrap_or_else(|| {
                tracing::debug!(id, locale, domain, "Missing translation");
                id.to_string()
            })
    }
}
