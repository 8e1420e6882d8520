//! Runs the plovr jar as a child process.

use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::process::{
    ExitStatus,
    Stdio,
};

use tokio::io::{
    AsyncBufReadExt,
    AsyncRead,
    BufReader,
};
use tokio::process::Command;

use super::build_config::BuildConfig;
use crate::error::{
    ConfigurationError,
    FilesystemError,
    ProcessLaunchError,
    Result,
};
use crate::services::OutputSink;

/// Prefix for stderr lines on the console stream.
const STDERR_PREFIX: &str = "Error: ";

/// `java -jar <plovr.jar> ...` with its output forwarded to a sink.
pub struct ProcessRunner<'a> {
    /// Canonical path of the Java binary
    java_bin: PathBuf,
    /// Canonical path of the plovr jar
    plovr_jar: PathBuf,
    /// Receives the child's output
    sink: &'a dyn OutputSink,
}

impl std::fmt::Debug for ProcessRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("java_bin", &self.java_bin)
            .field("plovr_jar", &self.plovr_jar)
            .finish_non_exhaustive()
    }
}

impl<'a> ProcessRunner<'a> {
    #[must_use]
    pub const fn new(java_bin: PathBuf, plovr_jar: PathBuf, sink: &'a dyn OutputSink) -> Self {
        Self { java_bin, plovr_jar, sink }
    }

    /// Writes `config` to a temporary file and runs `plovr <verb> <file>`.
    ///
    /// The temporary file is removed once the child is done, whether it
    /// succeeded, failed, or never started.
    pub async fn run_with_config(
        &self,
        config: &BuildConfig,
        verb: &str,
        redirect_to: Option<&Path>,
    ) -> Result<ExitStatus> {
        let json = config.to_json().map_err(ConfigurationError::Decode)?;

        let mut file = tempfile::Builder::new()
            .prefix("config")
            .suffix(".json")
            .tempfile()
            .map_err(FilesystemError::TempFile)?;
        file.write_all(json.as_bytes()).map_err(FilesystemError::TempFile)?;
        file.flush().map_err(FilesystemError::TempFile)?;
        // The child opens the file by name; close our handle first.
        let path = file.into_temp_path();

        let args = [verb.to_string(), path.to_string_lossy().into_owned()];
        let result = self.run(&args, redirect_to).await;

        if let Err(e) = path.close() {
            tracing::warn!("Failed to remove temporary configuration: {}", e);
        }

        result
    }

    /// Runs the jar with `args` and waits for it.
    ///
    /// stdin is closed right away. stdout goes to `redirect_to` when given,
    /// otherwise to the sink; stderr always goes to the sink, prefixed with
    /// `Error: `. Both pipes are drained while the child runs.
    pub async fn run(
        &self,
        args: &[String],
        redirect_to: Option<&Path>,
    ) -> Result<ExitStatus> {
        let argv = self.argv(args);
        let mut command_line = argv.iter().map(|arg| shell_quote(arg)).collect::<Vec<_>>().join(" ");
        if let Some(target) = redirect_to {
            command_line.push_str(" > ");
            command_line.push_str(&shell_quote(&target.to_string_lossy()));
        }
        self.sink.write_line(&format!("Executing \"{command_line}\"..."));

        let launch_error = |source| ProcessLaunchError { command: command_line.clone(), source };

        let Some((program, program_args)) = argv.split_first() else {
            return Err(launch_error(std::io::Error::other("empty command line")).into());
        };
        let mut command = Command::new(program);
        command.args(program_args).stdin(Stdio::piped()).stderr(Stdio::piped());
        match redirect_to {
            Some(target) => {
                let file = std::fs::File::create(target)
                    .map_err(|source| FilesystemError::OutputFile { path: target.to_path_buf(), source })?;
                command.stdout(Stdio::from(file));
            }
            None => {
                command.stdout(Stdio::piped());
            }
        }

        let mut child = command.spawn().map_err(launch_error)?;
        drop(child.stdin.take());

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (status, (), ()) = tokio::join!(
            child.wait(),
            forward_lines(stdout, self.sink, ""),
            forward_lines(stderr, self.sink, STDERR_PREFIX),
        );
        let status = status.map_err(launch_error)?;

        tracing::debug!(command = %command_line, %status, "Process finished");
        Ok(status)
    }

    /// Full command line. Windows needs `cmd /C` to find `java` the way a
    /// shell would.
    fn argv(&self, args: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 5);
        if cfg!(windows) {
            argv.extend(["cmd".to_string(), "/C".to_string()]);
        }
        argv.push(self.java_bin.to_string_lossy().into_owned());
        argv.push("-jar".to_string());
        argv.push(self.plovr_jar.to_string_lossy().into_owned());
        argv.extend(args.iter().cloned());
        argv
    }
}

/// Sends every line read from `reader` to `sink` until end of stream.
///
/// Invalid UTF-8 is replaced rather than ending the stream, so the pipe is
/// always read to the end.
async fn forward_lines<R>(reader: Option<R>, sink: &dyn OutputSink, prefix: &str)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                sink.write_line(&format!("{prefix}{line}"));
            }
            Err(e) => {
                tracing::debug!("Failed to read child output: {}", e);
                break;
            }
        }
    }
}

/// Quotes an argument for display the way a POSIX shell would accept it.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@' | '+'));
    if plain { arg.to_string() } else { format!("'{}'", arg.replace('\'', r"'\''")) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::error::Error;
    use crate::services::MemorySink;

    #[rstest]
    #[case("build", "build")]
    #[case("/tmp/config1a2b.json", "/tmp/config1a2b.json")]
    #[case("my dir/app.js", "'my dir/app.js'")]
    #[case("it's", r"'it'\''s'")]
    #[case("", "''")]
    fn test_shell_quote(#[case] arg: &str, #[case] expected: &str) {
        assert_eq!(shell_quote(arg), expected);
    }

    #[cfg(unix)]
    mod unix {
        use std::os::unix::fs::PermissionsExt;

        use serde_json::json;
        use tempfile::TempDir;

        use super::*;

        /// Writes an executable shell script standing in for `java`.
        /// Arguments arrive as `-jar <jar> <verb> <file>`.
        fn fake_java(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("java");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn config() -> BuildConfig {
            BuildConfig::from_value(json!({"id": "app", "inputs": ["main.js"]})).unwrap()
        }

        #[tokio::test]
        async fn run_with_config_removes_temp_file_after_failure() {
            let temp_dir = TempDir::new().unwrap();
            let record = temp_dir.path().join("seen-config");
            let java = fake_java(
                temp_dir.path(),
                &format!("echo \"$4\" > '{}'\necho 'compilation failed' >&2\nexit 3", record.display()),
            );
            let sink = MemorySink::new();
            let runner = ProcessRunner::new(java, PathBuf::from("plovr.jar"), &sink);

            let status = runner.run_with_config(&config(), "build", None).await.unwrap();

            assert_that!(status.code(), some(eq(3)));
            let seen = std::fs::read_to_string(&record).unwrap();
            let seen = Path::new(seen.trim());
            assert_that!(seen.file_name().unwrap().to_string_lossy().starts_with("config"), eq(true));
            assert_that!(seen.extension().and_then(|ext| ext.to_str()), some(eq("json")));
            assert_that!(seen.exists(), eq(false));
            assert_that!(sink.lines(), contains(eq("Error: compilation failed")));
        }

        #[tokio::test]
        async fn run_with_config_passes_the_serialized_config() {
            let temp_dir = TempDir::new().unwrap();
            let java = fake_java(temp_dir.path(), "echo \"$1 $3\"\ncat \"$4\"");
            let sink = MemorySink::new();
            let runner = ProcessRunner::new(java, PathBuf::from("plovr.jar"), &sink);

            let status = runner.run_with_config(&config(), "serve", None).await.unwrap();

            assert_that!(status.success(), eq(true));
            let lines = sink.lines();
            assert_that!(lines.first().unwrap(), starts_with("Executing \""));
            assert_that!(lines.get(1), some(eq("-jar serve")));
            let printed: serde_json::Value = serde_json::from_str(&lines[2..].join("\n")).unwrap();
            assert_that!(printed, eq(&json!({"id": "app", "inputs": ["main.js"]})));
        }

        #[tokio::test]
        async fn run_redirects_stdout_to_file() {
            let temp_dir = TempDir::new().unwrap();
            let java = fake_java(temp_dir.path(), "echo 'var app = 1;'\necho 'warning' >&2");
            let output = temp_dir.path().join("app-en.js");
            let sink = MemorySink::new();
            let runner = ProcessRunner::new(java.clone(), PathBuf::from("/opt/plovr.jar"), &sink);

            let status = runner.run(&["build".to_string(), "c.json".to_string()], Some(&output)).await.unwrap();

            assert_that!(status.success(), eq(true));
            assert_that!(std::fs::read_to_string(&output).unwrap(), eq("var app = 1;\n"));
            assert_that!(
                sink.lines(),
                elements_are![
                    eq(&format!(
                        "Executing \"{} -jar /opt/plovr.jar build c.json > {}\"...",
                        shell_quote(&java.to_string_lossy()),
                        shell_quote(&output.to_string_lossy())
                    )),
                    eq("Error: warning")
                ]
            );
        }

        #[tokio::test]
        async fn run_drains_large_output_on_both_pipes() {
            let temp_dir = TempDir::new().unwrap();
            let java = fake_java(
                temp_dir.path(),
                "i=0\nwhile [ $i -lt 5000 ]; do echo \"out $i\"; echo \"err $i\" >&2; i=$((i+1)); done",
            );
            let sink = MemorySink::new();
            let runner = ProcessRunner::new(java, PathBuf::from("plovr.jar"), &sink);

            let status = runner.run(&[], None).await.unwrap();

            assert_that!(status.success(), eq(true));
            // Executing line + 5000 stdout lines + 5000 stderr lines
            assert_that!(sink.lines(), len(eq(10_001)));
        }

        #[tokio::test]
        async fn run_closes_stdin() {
            let temp_dir = TempDir::new().unwrap();
            let java = fake_java(temp_dir.path(), "cat > /dev/null\necho done");
            let sink = MemorySink::new();
            let runner = ProcessRunner::new(java, PathBuf::from("plovr.jar"), &sink);

            runner.run(&[], None).await.unwrap();

            assert_that!(sink.lines().last().unwrap(), eq("done"));
        }

        #[tokio::test]
        async fn run_reports_launch_failure() {
            let temp_dir = TempDir::new().unwrap();
            let sink = MemorySink::new();
            let runner =
                ProcessRunner::new(temp_dir.path().join("no-java"), PathBuf::from("plovr.jar"), &sink);

            let result = runner.run(&["build".to_string()], None).await;

            assert!(matches!(
                result,
                Err(Error::ProcessLaunch(ProcessLaunchError { ref command, .. }))
                    if command.contains("no-java -jar plovr.jar build")
            ));
        }

        #[tokio::test]
        async fn run_with_config_removes_temp_file_when_launch_fails() {
            let temp_dir = TempDir::new().unwrap();
            let sink = MemorySink::new();
            let runner =
                ProcessRunner::new(temp_dir.path().join("no-java"), PathBuf::from("plovr.jar"), &sink);

            let result = runner.run_with_config(&config(), "build", None).await;

            assert!(matches!(result, Err(Error::ProcessLaunch(_))));
            // Executing "<java> -jar plovr.jar build <temp config>"...
            let executing = sink.lines().first().cloned().unwrap();
            let temp_config = executing
                .trim_end_matches("\"...")
                .rsplit(' ')
                .next()
                .map(|quoted| quoted.trim_matches('\''))
                .unwrap();
            assert_that!(temp_config, ends_with(".json"));
            assert_that!(Path::new(temp_config).exists(), eq(false));
        }

        #[tokio::test]
        async fn run_reports_unwritable_redirect_target() {
            let temp_dir = TempDir::new().unwrap();
            let java = fake_java(temp_dir.path(), "echo never");
            let target = temp_dir.path().join("missing-dir/app.js");
            let sink = MemorySink::new();
            let runner = ProcessRunner::new(java, PathBuf::from("plovr.jar"), &sink);

            let result = runner.run(&["build".to_string()], Some(&target)).await;

            assert!(matches!(
                result,
                Err(Error::Filesystem(FilesystemError::OutputFile { ref path, .. })) if *path == target
            ));
        }
    }
}
