use super::ProjectContext;
use crate::cli::ToolArgs;
use crate::error::Result;
use crate::services::OutputSink;

/// Runs `plovr serve` with the normalized config until the server exits.
///
/// Output goes to the sink rather than to a file, so `output-file` is dropped;
/// `locales` is a build-only key and is dropped too.
pub async fn start(tools: &ToolArgs, sink: &dyn OutputSink) -> Result<()> {
    let context = ProjectContext::load(tools.project.project_dir.as_deref())?;
    let runner = context.runner(tools.java_bin.as_deref(), tools.plovr_jar.as_deref(), sink)?;

    let mut config = context.normalized_config(&tools.config)?;
    config.output_file = None;
    config.locales = None;

    let status = runner.run_with_config(&config, "serve", None).await?;
    if status.success() {
        tracing::info!(%status, "plovr server stopped");
    } else {
        tracing::warn!(%status, "plovr server exited");
    }
    Ok(())
}
