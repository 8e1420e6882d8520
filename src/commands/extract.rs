use std::path::Path;

use super::ProjectContext;
use crate::cli::OutputFormat;
use crate::error::{
    ConfigurationError,
    Result,
};
use crate::plovr::MessageExtractor;
use crate::services::OutputSink;
use crate::settings::FileMatcher;

/// Lists the message ids referenced by the plovr configs below `dir`.
pub fn extract(
    dir: Option<&Path>,
    project_dir: Option<&Path>,
    format: OutputFormat,
    sink: &dyn OutputSink,
) -> Result<()> {
    let context = ProjectContext::load(project_dir)?;
    let root = dir.unwrap_or_else(|| context.project_root()).to_path_buf();
    let patterns = &context.settings().extractor;

    let matcher = FileMatcher::new(root, &patterns.include_patterns, &patterns.exclude_patterns)?;
    let messages = MessageExtractor::new(matcher).extract();

    match format {
        OutputFormat::Text => {
            for message in &messages {
                sink.write_line(&format!("{}\t{}", message.id, message.source.display()));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&messages).map_err(ConfigurationError::Decode)?;
            sink.write_line(&json);
        }
    }

    tracing::info!(count = messages.len(), "Extracted messages");
    Ok(())
}
