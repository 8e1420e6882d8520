//! Collects the message ids that plovr configs reference through `MSG_` defines.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::settings::FileMatcher;

/// Only files with this suffix are inspected.
const CONFIG_SUFFIX: &str = ".js";

#[allow(clippy::expect_used)]
static MESSAGE_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\.)MSG_[^.]+$").expect("valid message define pattern"));

/// A message id and the config that references it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMessage {
    pub id: String,
    pub source: PathBuf,
}

/// Walks a directory tree for plovr configs.
#[derive(Debug, Clone)]
pub struct MessageExtractor {
    matcher: FileMatcher,
}

impl MessageExtractor {
    #[must_use]
    pub const fn new(matcher: FileMatcher) -> Self {
        Self { matcher }
    }

    /// Every message referenced below the matcher's root, sorted by id and
    /// then by source. Files that are not JSON objects with a `define` object
    /// are skipped.
    #[must_use]
    pub fn extract(&self) -> Vec<ExtractedMessage> {
        let mut messages: Vec<_> = self
            .matcher
            .collect_files()
            .iter()
            .filter(|path| path.to_string_lossy().ends_with(CONFIG_SUFFIX))
            .flat_map(|path| extract_file(path))
            .collect();

        messages.sort();
        tracing::debug!(
            root = %self.matcher.root().display(),
            count = messages.len(),
            "Extracted messages"
        );
        messages
    }
}

/// Messages referenced by one config file.
fn extract_file(path: &Path) -> Vec<ExtractedMessage> {
    let Ok(text) = std::fs::read_to_string(path) else {
        tracing::debug!(path = %path.display(), "Skipping unreadable file");
        return Vec::new();
    };
    let Ok(Some(Value::Object(content))) =
        jsonc_parser::parse_to_serde_value(&text, &jsonc_parser::ParseOptions::default())
    else {
        return Vec::new();
    };
    let Some(Value::Object(define)) = content.get("define") else {
        return Vec::new();
    };

    define
        .iter()
        .filter(|(key, _)| MESSAGE_DEFINE.is_match(key))
        .filter_map(|(_, id)| id.as_str())
        .map(|id| ExtractedMessage { id: id.to_string(), source: path.to_path_buf() })
        .collect()
}
