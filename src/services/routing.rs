use std::collections::BTreeMap;

use super::Router;
use crate::error::ResolutionError;

/// Placeholder in route patterns filled from the locale context.
const LOCALE_PLACEHOLDER: &str = "{_locale}";

/// Named route patterns with a locale context.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    base_url: String,
    routes: BTreeMap<String, String>,
    locale: Option<String>,
}

impl RouteTable {
    #[must_use]
    pub const fn new(base_url: String, routes: BTreeMap<String, String>) -> Self {
        Self { base_url, routes, locale: None }
    }
}

impl Router for RouteTable {
    fn set_locale_context(&mut self, locale: &str) {
        self.locale = Some(locale.to_string());
    }

    fn generate_url(&self, route: &str) -> Result<String, ResolutionError> {
        let pattern = self
            .routes
            .get(route)
            .ok_or_else(|| ResolutionError::UnknownRoute { name: route.to_string() })?;

        let path = if pattern.contains(LOCALE_PLACEHOLDER) {
            let locale = self
                .locale
                .as_deref()
                .ok_or_else(|| ResolutionError::MissingLocaleContext { name: route.to_string() })?;
            pattern.replace(LOCALE_PLACEHOLDER, locale)
        } else {
            pattern.clone()
        };

        Ok(format!("{}{path}", self.base_url))
    }
}
