//! `%name%` placeholder resolution.

use std::cell::RefCell;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{
    Map,
    Value,
};

use super::ParameterResolver;
use crate::error::ResolutionError;

/// `%%` (escaped percent) or `%name%` (placeholder).
#[allow(clippy::expect_used)] // literal pattern
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%|%([^%\s]+)%").expect("placeholder pattern"));

/// Parameters declared in the project settings.
#[derive(Debug, Clone, Default)]
pub struct ParameterBag {
    parameters: Map<String, Value>,
}

impl ParameterBag {
    #[must_use]
    pub const fn new(parameters: Map<String, Value>) -> Self {
        Self { parameters }
    }
}

impl ParameterResolver for ParameterBag {
    fn resolve_parameter(&self, name: &str) -> Result<Value, ResolutionError> {
        OpenLookups { parameters: &self.parameters, open: RefCell::default() }.resolve_parameter(name)
    }
}

/// One top-level lookup. Parameter values may reference other parameters;
/// `open` holds the names currently being expanded so a cycle is reported
/// instead of recursing forever.
struct OpenLookups<'a> {
    /// Declared parameters
    parameters: &'a Map<String, Value>,
    /// Lookup stack, outermost first
    open: RefCell<Vec<String>>,
}

impl ParameterResolver for OpenLookups<'_> {
    fn resolve_parameter(&self, name: &str) -> Result<Value, ResolutionError> {
        let value = self
            .parameters
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownParameter { name: name.to_string() })?;

        if self.open.borrow().iter().any(|open| open == name) {
            return Err(ResolutionError::CircularParameter { name: name.to_string() });
        }

        self.open.borrow_mut().push(name.to_string());
        let resolved = self.resolve_value(value);
        self.open.borrow_mut().pop();
        resolved
    }
}

/// Resolves the placeholders in `raw`.
///
/// A string that consists of a single placeholder takes the parameter's value
/// as is, so `"%debug%"` can become `true`. Embedded placeholders are
/// stringified and must refer to scalar values. `%%` yields a literal `%`;
/// a lone `%` is left untouched.
pub fn resolve_string<R>(raw: &str, parameters: &R) -> Result<Value, ResolutionError>
where
    R: ParameterResolver + ?Sized,
{
    if let Some(captures) = PLACEHOLDER.captures(raw)
        && let Some(name) = captures.get(1)
        && name.start() == 1
        && name.end() + 1 == raw.len()
    {
        return parameters.resolve_parameter(name.as_str());
    }

    let mut resolved = String::with_capacity(raw.len());
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(raw) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        resolved.push_str(raw.get(last..whole.start()).unwrap_or_default());
        last = whole.end();

        let Some(name) = captures.get(1) else {
            resolved.push('%');
            continue;
        };
        match parameters.resolve_parameter(name.as_str())? {
            Value::String(value) => resolved.push_str(&value),
            Value::Null => {}
            value @ (Value::Bool(_) | Value::Number(_)) => resolved.push_str(&value.to_string()),
            Value::Array(_) | Value::Object(_) => {
                return Err(ResolutionError::NonScalarParameter {
                    name: name.as_str().to_string(),
                    template: raw.to_string(),
                });
            }
        }
    }
    resolved.push_str(raw.get(last..).unwrap_or_default());

    Ok(Value::String(resolved))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn bag() -> ParameterBag {
        let Value::Object(parameters) = json!({
            "kernel.root_dir": "/project/app",
            "web_dir": "%kernel.root_dir%/../web",
            "debug": true,
            "port": 9810,
            "locales": ["en", "fr"],
        }) else {
            unreachable!()
        };
        ParameterBag::new(parameters)
    }

    #[rstest]
    #[case("%kernel.root_dir%/Resources/js", json!("/project/app/Resources/js"))]
    #[case("%web_dir%/js", json!("/project/app/../web/js"))]
    #[case("%debug%", json!(true))]
    #[case("%locales%", json!(["en", "fr"]))]
    #[case("port-%port%", json!("port-9810"))]
    #[case("100%% done", json!("100% done"))]
    #[case("50% of %port%", json!("50% of 9810"))]
    #[case("/plain/path", json!("/plain/path"))]
    fn test_resolve_string(#[case] raw: &str, #[case] expected: Value) {
        let result = resolve_string(raw, &bag()).unwrap();

        assert_eq!(result, expected);
    }

    #[googletest::test]
    fn test_resolve_string_unknown_parameter() {
        let result = resolve_string("%missing%/js", &bag());

        expect_that!(
            result,
            err(eq(&ResolutionError::UnknownParameter { name: "missing".to_string() }))
        );
    }

    #[rstest]
    fn test_resolve_string_embedded_array_is_rejected() {
        let result = resolve_string("locales: %locales%", &bag());

        assert!(matches!(result, Err(ResolutionError::NonScalarParameter { name, .. }) if name == "locales"));
    }

    #[googletest::test]
    fn test_resolve_value_nested() {
        let value = json!({"app.DEBUG": "%debug%", "app.DIRS": ["%web_dir%", 3]});

        let result = bag().resolve_value(&value).unwrap();

        expect_that!(
            result,
            eq(&json!({"app.DEBUG": true, "app.DIRS": ["/project/app/../web", 3]}))
        );
    }

    fn cyclic_bag() -> ParameterBag {
        let Value::Object(parameters) = json!({
            "a": "%b%/x",
            "b": "%a%/y",
            "self": "%self%",
            "base": "/srv",
            "twice": "%base%:%base%",
        }) else {
            unreachable!()
        };
        ParameterBag::new(parameters)
    }

    #[rstest]
    #[case("%a%", "a")]
    #[case("prefix/%b%", "b")]
    #[case("%self%", "self")]
    fn test_resolve_string_circular_reference(#[case] raw: &str, #[case] expected: &str) {
        let result = resolve_string(raw, &cyclic_bag());

        assert!(
            matches!(result, Err(ResolutionError::CircularParameter { ref name }) if name == expected),
            "{result:?}"
        );
    }

    #[googletest::test]
    fn test_resolve_string_repeated_reference_is_not_a_cycle() {
        let result = resolve_string("%twice%", &cyclic_bag());

        expect_that!(result, ok(eq(&json!("/srv:/srv"))));
    }
}
