//! Finds the Java binary, the plovr jar and build configuration files.

use std::ffi::{
    OsStr,
    OsString,
};
use std::path::{
    Path,
    PathBuf,
};

use super::build_config::BuildConfig;
use crate::error::{
    ConfigurationError,
    FilesystemError,
    Result,
};
use crate::services::BundleLocator;
use crate::settings::ProjectSettings;

/// Where `@Bundle/file.json` configs live inside a bundle.
const BUNDLE_CONFIG_DIR: &str = "Resources/config/plovr";
/// Sub-paths starting with this are taken as-is.
const BUNDLE_RESOURCES_PREFIX: &str = "/Resources/";
/// Suffixes tried on Windows when `PATHEXT` is not set.
const DEFAULT_WINDOWS_SUFFIXES: [&str; 4] = [".exe", ".bat", ".cmd", ".com"];

/// Picks the Java binary: `override_path`, then `javaBin` from the settings,
/// then the first `java` on `PATH`.
///
/// Returns the canonical path.
pub fn locate_java_bin(
    override_path: Option<&Path>,
    settings: &ProjectSettings,
) -> Result<PathBuf, FilesystemError> {
    let candidate = match override_path.or(settings.java_bin.as_deref()) {
        Some(path) => path.to_path_buf(),
        None => detect_java_bin(
            std::env::var_os("PATH").or_else(|| std::env::var_os("Path")).as_deref(),
            std::env::var_os("PATHEXT").as_deref(),
        )
        .ok_or(FilesystemError::JavaNotFound)?,
    };

    if !is_executable(&candidate) {
        return Err(FilesystemError::JavaNotExecutable { path: candidate });
    }
    tracing::debug!(java = %candidate.display(), "Using Java binary");
    candidate.canonicalize().map_err(|_| FilesystemError::JavaNotExecutable { path: candidate })
}

/// Picks the plovr jar: `override_path`, then `plovrJar` from the settings.
///
/// Returns the canonical path.
pub fn locate_plovr_jar(
    override_path: Option<&Path>,
    settings: &ProjectSettings,
) -> Result<PathBuf, FilesystemError> {
    let candidate = override_path
        .or(settings.plovr_jar.as_deref())
        .ok_or(FilesystemError::JarNotConfigured)?;

    if !is_readable(candidate) {
        return Err(FilesystemError::JarNotReadable { path: candidate.to_path_buf() });
    }
    candidate
        .canonicalize()
        .map_err(|_| FilesystemError::JarNotReadable { path: candidate.to_path_buf() })
}

/// Turns the config argument into a file path.
///
/// `@AcmeBundle/app.json` is looked up in the bundle's
/// `Resources/config/plovr` directory, unless the sub-path already starts with
/// `/Resources/`. Anything else is a plain path.
pub fn locate_build_config(expr: &str, bundles: &dyn BundleLocator) -> Result<PathBuf> {
    let path = match expr.strip_prefix('@') {
        Some(alias) => {
            let (bundle, sub_path) = alias.find('/').map_or((alias, ""), |pos| alias.split_at(pos));
            let mut path = bundles.bundle_path(bundle)?;
            if sub_path.starts_with(BUNDLE_RESOURCES_PREFIX) {
                path.push(sub_path.trim_start_matches('/'));
            } else {
                path.push(BUNDLE_CONFIG_DIR);
                path.push(sub_path.trim_start_matches('/'));
            }
            path
        }
        None => PathBuf::from(expr),
    };

    if !is_readable(&path) {
        return Err(FilesystemError::ConfigNotReadable { path }.into());
    }
    Ok(path)
}

/// Reads and decodes a build configuration file.
pub fn load_build_config(path: &Path) -> Result<BuildConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| FilesystemError::Read { path: path.to_path_buf(), source })?;

    let config = BuildConfig::from_json_str(&text).map_err(|e| match e {
        ConfigurationError::InvalidShape(errors) => ConfigurationError::InvalidDocument {
            path: path.to_path_buf(),
            reason: crate::error::format_validation_errors(&errors),
        },
        other => ConfigurationError::InvalidDocument { path: path.to_path_buf(), reason: other.to_string() },
    })?;

    tracing::debug!(path = %path.display(), "Loaded plovr configuration");
    Ok(config)
}

/// Searches `path_var` for an executable `java`.
fn detect_java_bin(path_var: Option<&OsStr>, path_ext: Option<&OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    let suffixes = executable_suffixes(path_ext);

    suffixes.iter().find_map(|suffix| {
        let mut name = OsString::from("java");
        name.push(suffix);
        std::env::split_paths(path_var)
            .map(|dir| dir.join(&name))
            .find(|file| file.is_file() && is_executable(file))
    })
}

fn executable_suffixes(path_ext: Option<&OsStr>) -> Vec<OsString> {
    if !cfg!(windows) {
        return vec![OsString::new()];
    }
    path_ext.map_or_else(
        || DEFAULT_WINDOWS_SUFFIXES.iter().map(OsString::from).collect(),
        |ext| {
            ext.to_string_lossy()
                .split(';')
                .filter(|suffix| !suffix.is_empty())
                .map(|suffix| OsString::from(suffix.to_ascii_lowercase()))
                .collect()
        },
    )
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata().is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}
