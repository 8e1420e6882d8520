//! Reads `.plovr.json`.

use std::io::ErrorKind;
use std::path::Path;

use super::{
    ProjectSettings,
    SettingsError,
};

/// Name of the project settings file, looked up at the project root.
pub const SETTINGS_FILE_NAME: &str = ".plovr.json";

/// Reads the settings file at `project_root`, or `None` when there is none.
///
/// Comments and trailing commas are accepted, as in plovr configs. An empty
/// file yields the defaults.
pub(super) fn load_from_project(
    project_root: &Path,
) -> Result<Option<ProjectSettings>, SettingsError> {
    let settings_path = project_root.join(SETTINGS_FILE_NAME);

    let content = match std::fs::read_to_string(&settings_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %settings_path.display(), "No project settings file");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(path = %settings_path.display(), "Reading project settings");

    let Some(value) = jsonc_parser::parse_to_serde_value(&content, &jsonc_parser::ParseOptions::default())
        .map_err(|e| SettingsError::Syntax(e.to_string()))?
    else {
        return Ok(Some(ProjectSettings::default()));
    };

    Ok(Some(serde_json::from_value(value)?))
}
