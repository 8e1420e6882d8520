//! Holds the loaded project settings.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ProjectSettings,
    SettingsError,
    loader,
};

/// Parameter that always points at the project root.
pub const PROJECT_DIR_PARAMETER: &str = "project_dir";

/// Loads `.plovr.json` and keeps the result.
#[derive(Default, Debug, Clone)]
pub struct SettingsManager {
    /// Settings in effect
    current_settings: ProjectSettings,

    /// Directory holding `.plovr.json`
    project_root: PathBuf,
}

impl SettingsManager {
    /// Starts out with the default settings.
    #[must_use]
    pub fn new(project_root: PathBuf) -> Self {
        Self { current_settings: ProjectSettings::default(), project_root }
    }

    /// Loads the settings file, or the defaults when there is none.
    ///
    /// Relative paths are anchored at the project root, and a `project_dir`
    /// parameter is added unless the file defines one.
    ///
    /// # Errors
    /// - `.plovr.json` cannot be read or parsed
    /// - the settings fail validation
    pub fn load_settings(&mut self) -> Result<(), SettingsError> {
        tracing::debug!("Loading settings for project: {:?}", self.project_root);

        let mut settings = loader::load_from_project(&self.project_root)?
            .map_or_else(ProjectSettings::default, |settings| {
                tracing::debug!("Loaded project settings: {:?}", settings);
                settings
            });

        settings.validate().map_err(SettingsError::ValidationErrors)?;

        settings = settings.anchored_at(&self.project_root);
        settings.parameters.entry(PROJECT_DIR_PARAMETER.to_string()).or_insert_with(|| {
            serde_json::Value::String(self.project_root.to_string_lossy().into_owned())
        });

        self.current_settings = settings;
        tracing::debug!(settings = ?self.current_settings, "Project settings loaded");

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &ProjectSettings {
        &self.current_settings
    }

    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}
