//! plovr configuration handling and invocation.

mod build_config;
mod extractor;
mod locator;
mod normalizer;
mod output_dir;
mod path_resolver;
mod planner;
mod runner;

pub use build_config::BuildConfig;
pub use extractor::{
    ExtractedMessage,
    MessageExtractor,
};
pub use locator::{
    load_build_config,
    locate_build_config,
    locate_java_bin,
    locate_plovr_jar,
};
pub use normalizer::ConfigNormalizer;
pub use path_resolver::PathResolver;
pub use planner::{
    DEFAULT_LOCALE,
    LOCALE_TOKEN,
    LocaleBuildPlanner,
    LocaleConfig,
    RenameMapChain,
    TRANSLATION_DOMAIN,
};
pub use runner::ProcessRunner;
