//! Test fakes
//!
//! `Translator` and `Router` stand-ins shared by the unit tests.
#![cfg(test)]

use std::sync::Mutex;

use crate::error::ResolutionError;
use crate::services::{
    Router,
    Translator,
};

/// Records `translate` calls and answers `"<locale>:<id>"`.
#[derive(Debug, Default)]
pub(crate) struct RecordingTranslator {
    calls: Mutex<Vec<(String, String, String)>>,
}

impl RecordingTranslator {
    /// `(id, locale, domain)` in call order
    pub(crate) fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl Translator for RecordingTranslator {
    fn translate(&self, id: &str, locale: &str, domain: &str) -> String {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((id.to_string(), locale.to_string(), domain.to_string()));
        }
        format!("{locale}:{id}")
    }
}

/// Generates `/<locale>/<route>` for the current locale context.
#[derive(Debug, Default)]
pub(crate) struct PrefixRouter {
    locale: Option<String>,
}

impl Router for PrefixRouter {
    fn set_locale_context(&mut self, locale: &str) {
        self.locale = Some(locale.to_string());
    }

    fn generate_url(&self, route: &str) -> Result<String, ResolutionError> {
        if route == "missing" {
            return Err(ResolutionError::UnknownRoute { name: route.to_string() });
        }
        self.locale
            .as_ref()
            .map(|locale| format!("/{locale}/{route}"))
            .ok_or_else(|| ResolutionError::MissingLocaleContext { name: route.to_string() })
    }
}
