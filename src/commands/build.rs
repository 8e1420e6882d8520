use std::process::ExitStatus;

use super::ProjectContext;
use crate::cli::ToolArgs;
use crate::error::{
    Error,
    Result,
};
use crate::plovr::LocaleBuildPlanner;
use crate::services::OutputSink;

/// `plovr build` once per locale, each into its own output file.
///
/// Locales are built in declared order. A failing locale stops the run unless
/// `allow_failure` is set; outputs of earlier locales are kept.
pub async fn build(tools: &ToolArgs, allow_failure: bool, sink: &dyn OutputSink) -> Result<()> {
    let context = ProjectContext::load(tools.project.project_dir.as_deref())?;
    let runner = context.runner(tools.java_bin.as_deref(), tools.plovr_jar.as_deref(), sink)?;
    let config = context.normalized_config(&tools.config)?;

    let translator = context.translations()?;
    let mut router = context.routes();
    let plan = LocaleBuildPlanner::new(&translator, &mut router, sink).plan(&config)?;

    for locale_config in &plan {
        tracing::info!(
            locale = locale_config.locale(),
            output = %locale_config.output_file().display(),
            "Building locale"
        );
        let status = runner
            .run_with_config(locale_config.config(), "build", Some(locale_config.output_file()))
            .await?;
        check_status(status, allow_failure)?;
    }

    Ok(())
}

fn check_status(status: ExitStatus, allow_failure: bool) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    if allow_failure {
        tracing::warn!(%status, "plovr build failed; continuing");
        return Ok(());
    }
    Err(Error::ToolFailed { verb: "build".to_string(), status })
}
