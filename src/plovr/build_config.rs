//! The plovr build configuration document.

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

use crate::error::{
    ConfigurationError,
    ValidationError,
};

/// Keys that hold a list of paths; a single string is accepted too.
const PATH_LIST_KEYS: [&str; 3] = ["paths", "inputs", "externs"];
/// Keys that hold a single path (template).
const PATH_KEYS: [&str; 5] = [
    "output-file",
    "variable-map-input-file",
    "variable-map-output-file",
    "property-map-input-file",
    "property-map-output-file",
];

/// A plovr config as read from disk.
///
/// Keys the bridge does not interpret (`id`, `mode`, `level`, ...) are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "one_or_many")]
    pub paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "one_or_many")]
    pub inputs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "one_or_many")]
    pub externs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub define: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<Vec<String>>,

    /// May contain `$locale`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_map_input_file: Option<String>,
    /// May contain `$locale`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_map_output_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_map_input_file: Option<String>,
    /// May contain `$locale`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_map_output_file: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Either `"a"` or `["a", "b"]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    /// A single path
    One(String),
    /// A list of paths
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    }))
}

impl BuildConfig {
    /// Checks the shape of the recognized keys, then decodes.
    ///
    /// Every malformed key is reported, not just the first one.
    ///
    /// # Errors
    /// - The document is not an object
    /// - A recognized key has the wrong type
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        validate_shape(&value).map_err(ConfigurationError::InvalidShape)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Parses a config file's text. Comments are allowed, as plovr allows them.
    ///
    /// # Errors
    /// - Invalid JSON
    /// - See [`BuildConfig::from_value`]
    pub fn from_json_str(text: &str) -> Result<Self, ConfigurationError> {
        let value = jsonc_parser::parse_to_serde_value(text, &jsonc_parser::ParseOptions::default())
            .map_err(|e| ConfigurationError::InvalidShape(vec![ValidationError::new("$", e.to_string())]))?
            .unwrap_or(Value::Null);
        Self::from_value(value)
    }

    /// Serializes for plovr.
    ///
    /// # Errors
    /// Fails only if a value cannot be represented as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Locales in declared order.
    #[must_use]
    pub fn locale_list(&self) -> Option<&[String]> {
        self.locales.as_deref()
    }
}

fn validate_shape(value: &Value) -> Result<(), Vec<ValidationError>> {
    let Value::Object(map) = value else {
        return Err(vec![ValidationError::new("$", "The configuration must be a JSON object")]);
    };

    let mut errors = Vec::new();

    for key in PATH_LIST_KEYS {
        match map.get(key) {
            None | Some(Value::Null | Value::String(_)) => {}
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        errors.push(ValidationError::new(
                            format!("{key}[{index}]"),
                            format!("\"{key}\" entries must be strings, got {item}"),
                        ));
                    }
                }
            }
            Some(other) => errors.push(ValidationError::new(
                key,
                format!("\"{key}\" must be a string or an array of strings, got {other}"),
            )),
        }
    }

    for key in PATH_KEYS {
        if let Some(other) = map.get(key)
            && !other.is_string()
            && !other.is_null()
        {
            errors.push(ValidationError::new(key, format!("\"{key}\" must be a string.")));
        }
    }

    if let Some(define) = map.get("define")
        && !define.is_object()
        && !define.is_null()
    {
        errors.push(ValidationError::new("define", "\"define\" must be an object."));
    }

    if let Some(locales) = map.get("locales")
        && !locales.is_null()
        && !locales.as_array().is_some_and(|items| items.iter().all(Value::is_string))
    {
        errors.push(ValidationError::new("locales", "\"locales\" must be an array of strings."));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
