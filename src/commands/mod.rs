//! Subcommand implementations.

mod build;
mod extract;
mod start;

use std::path::{
    Path,
    PathBuf,
};

pub use build::build;
pub use extract::extract;
pub use start::start;

use crate::cli::Commands;
use crate::error::{
    FilesystemError,
    Result,
};
use crate::plovr::{
    BuildConfig,
    ConfigNormalizer,
    PathResolver,
    ProcessRunner,
    load_build_config,
    locate_build_config,
    locate_java_bin,
    locate_plovr_jar,
};
use crate::services::{
    BundleRegistry,
    OutputSink,
    ParameterBag,
    RouteTable,
    TranslationCatalogue,
};
use crate::settings::{
    FileMatcher,
    ProjectSettings,
    SettingsManager,
};

/// Runs the parsed subcommand.
pub async fn run(command: Commands, sink: &dyn OutputSink) -> Result<()> {
    match command {
        Commands::Build { tools, allow_failure } => build(&tools, allow_failure, sink).await,
        Commands::Start { tools } => start(&tools, sink).await,
        Commands::Extract { dir, project, format } => {
            extract(dir.as_deref(), project.project_dir.as_deref(), format, sink)
        }
    }
}

/// Project settings and the services built from them.
#[derive(Debug)]
pub struct ProjectContext {
    settings: SettingsManager,
    bundles: BundleRegistry,
    parameters: ParameterBag,
}

impl ProjectContext {
    /// Loads `.plovr.json` from `project_dir`, or from the current directory.
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let root = match project_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()
                .map_err(|source| FilesystemError::Read { path: PathBuf::from("."), source })?,
        };

        let mut settings = SettingsManager::new(root);
        settings.load_settings()?;

        let project = settings.get_settings();
        let bundles = BundleRegistry::new(project.bundles.clone());
        let parameters = ParameterBag::new(project.parameters.clone());

        Ok(Self { settings, bundles, parameters })
    }

    #[must_use]
    pub const fn settings(&self) -> &ProjectSettings {
        self.settings.get_settings()
    }

    #[must_use]
    pub fn project_root(&self) -> &Path {
        self.settings.project_root()
    }

    #[must_use]
    pub fn path_resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.bundles, &self.parameters)
    }

    /// Locates the config named on the command line, then loads and
    /// normalizes it.
    pub fn normalized_config(&self, expr: &str) -> Result<BuildConfig> {
        let path = locate_build_config(expr, &self.bundles)?;
        let raw = load_build_config(&path)?;
        ConfigNormalizer::new(self.path_resolver()).normalize(raw)
    }

    /// Loads the catalogues configured under `translations`.
    pub fn translations(&self) -> Result<TranslationCatalogue> {
        let settings = &self.settings().translations;
        let matcher = FileMatcher::new(
            self.project_root().to_path_buf(),
            &settings.include_patterns,
            &settings.exclude_patterns,
        )?;
        Ok(TranslationCatalogue::load(&matcher, settings.fallback_locale.clone()))
    }

    #[must_use]
    pub fn routes(&self) -> RouteTable {
        let routing = &self.settings().routing;
        RouteTable::new(routing.base_url.clone(), routing.routes.clone())
    }

    /// Locates Java and the jar, preferring the command-line overrides.
    pub fn runner<'s>(
        &self,
        java_bin: Option<&Path>,
        plovr_jar: Option<&Path>,
        sink: &'s dyn OutputSink,
    ) -> Result<ProcessRunner<'s>> {
        let java_bin = locate_java_bin(java_bin, self.settings())?;
        let plovr_jar = locate_plovr_jar(plovr_jar, self.settings())?;
        Ok(ProcessRunner::new(java_bin, plovr_jar, sink))
    }
}
