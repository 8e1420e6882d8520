//! Project settings (`.plovr.json`)
/// Settings file loader
mod loader;
/// Settings manager
mod manager;
/// Translation catalogue and config file matcher
mod matcher;
/// Settings types and validation
mod types;

pub use loader::SETTINGS_FILE_NAME;
pub use manager::{
    PROJECT_DIR_PARAMETER,
    SettingsManager,
};
pub use matcher::{
    FileMatcher,
    MatcherError,
};
pub use types::{
    ExtractorSettings,
    ProjectSettings,
    RoutingSettings,
    SettingsError,
    TranslationSettings,
};
