//! Expands one build configuration into a build per locale.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{
    Map,
    Value,
};

use super::build_config::BuildConfig;
use super::output_dir::{
    ensure_parent_dir,
    ensure_writable,
};
use crate::error::{
    ConfigurationError,
    Result,
};
use crate::services::{
    OutputSink,
    Router,
    Translator,
};

/// Replaced by the active locale code in output paths.
pub const LOCALE_TOKEN: &str = "$locale";
/// Used when a config declares no `locales`.
pub const DEFAULT_LOCALE: &str = "en";
/// Translation domain for `MSG_` defines.
pub const TRANSLATION_DOMAIN: &str = "messages";
/// Closure's locale define.
const GOOG_LOCALE: &str = "goog.LOCALE";

#[allow(clippy::expect_used)]
static LOCALIZED_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(MSG|ROUTE)_[A-Z_0-9]+$").expect("valid define pattern"));

/// Threads a rename map from one locale's build into the next.
///
/// The output map of a build becomes the input map of the following build, so
/// every locale is compiled with the same renaming. A locale-specific output
/// map (one containing `$locale`) breaks the chain: each locale reads and
/// writes its own map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameMapChain {
    /// Output map path, possibly containing `$locale`
    output_template: Option<String>,
    /// Input map for the next locale
    next_input: Option<String>,
}

impl RenameMapChain {
    #[must_use]
    pub const fn new(input: Option<String>, output_template: Option<String>) -> Self {
        Self { output_template, next_input: input }
    }

    #[must_use]
    pub fn is_locale_specific(&self) -> bool {
        self.output_template.as_deref().is_some_and(|template| template.contains(LOCALE_TOKEN))
    }

    /// Returns the `(input, output)` map paths for `locale` and moves the
    /// chain forward.
    pub fn advance(&mut self, locale: &str) -> (Option<String>, Option<String>) {
        let output = self.output_template.as_ref().map(|template| template.replace(LOCALE_TOKEN, locale));

        if self.is_locale_specific() {
            let input = self.next_input.as_ref().map(|input| input.replace(LOCALE_TOKEN, locale));
            return (input, output);
        }

        let input = self.next_input.clone();
        if output.is_some() {
            self.next_input.clone_from(&output);
        }
        (input, output)
    }
}

/// A build for exactly one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleConfig {
    /// Locale code
    locale: String,
    /// `output-file` with `$locale` substituted
    output_file: PathBuf,
    /// Config for plovr
    config: BuildConfig,
}

impl LocaleConfig {
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Where plovr's stdout goes for this locale.
    #[must_use]
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// The config handed to plovr. It carries neither `output-file` nor
    /// `locales`.
    #[must_use]
    pub const fn config(&self) -> &BuildConfig {
        &self.config
    }
}

/// Produces the per-locale builds of a normalized config.
pub struct LocaleBuildPlanner<'a> {
    translator: &'a dyn Translator,
    router: &'a mut dyn Router,
    sink: &'a dyn OutputSink,
}

impl std::fmt::Debug for LocaleBuildPlanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleBuildPlanner").finish_non_exhaustive()
    }
}

impl<'a> LocaleBuildPlanner<'a> {
    #[must_use]
    pub fn new(
        translator: &'a dyn Translator,
        router: &'a mut dyn Router,
        sink: &'a dyn OutputSink,
    ) -> Self {
        Self { translator, router, sink }
    }

    /// One [`LocaleConfig`] per declared locale, in declared order. A config
    /// without `locales` is built for [`DEFAULT_LOCALE`].
    ///
    /// Output directories are created as a side effect.
    ///
    /// # Errors
    /// - `output-file` is missing
    /// - A `MSG_`/`ROUTE_` define is not a string, or its route is unknown
    /// - An output directory cannot be created or is not writable
    pub fn plan(&mut self, config: &BuildConfig) -> Result<Vec<LocaleConfig>> {
        let output_template = config.output_file.as_deref().ok_or(ConfigurationError::MissingOutputFile)?;

        let locales = config
            .locale_list()
            .map_or_else(|| vec![DEFAULT_LOCALE.to_string()], <[String]>::to_vec);

        let mut variable_maps = RenameMapChain::new(
            config.variable_map_input_file.clone(),
            config.variable_map_output_file.clone(),
        );
        let mut property_maps = RenameMapChain::new(
            config.property_map_input_file.clone(),
            config.property_map_output_file.clone(),
        );

        let mut planned = Vec::with_capacity(locales.len());
        for locale in locales {
            let output_file = PathBuf::from(output_template.replace(LOCALE_TOKEN, &locale));
            let dir = ensure_parent_dir(&output_file, Some(self.sink))?;
            ensure_writable(dir.as_deref().unwrap_or_else(|| Path::new(".")))?;

            let mut locale_config = config.clone();
            locale_config.output_file = None;
            locale_config.locales = None;

            let define = locale_config.define.get_or_insert_with(Map::new);
            define.insert(GOOG_LOCALE.to_string(), Value::String(locale.clone()));
            self.localize_defines(define, &locale)?;

            (locale_config.variable_map_input_file, locale_config.variable_map_output_file) =
                variable_maps.advance(&locale);
            (locale_config.property_map_input_file, locale_config.property_map_output_file) =
                property_maps.advance(&locale);

            for map_file in [
                &locale_config.variable_map_output_file,
                &locale_config.property_map_output_file,
            ]
            .into_iter()
            .flatten()
            {
                ensure_parent_dir(Path::new(map_file), Some(self.sink))?;
            }

            tracing::debug!(locale = %locale, output = %output_file.display(), "Planned locale build");
            planned.push(LocaleConfig { locale, output_file, config: locale_config });
        }

        Ok(planned)
    }

    /// `*.MSG_*` defines become translations, `*.ROUTE_*` defines become URLs.
    fn localize_defines(&mut self, define: &mut Map<String, Value>, locale: &str) -> Result<()> {
        for (key, value) in define.iter_mut() {
            let Some(captures) = LOCALIZED_DEFINE.captures(key) else {
                continue;
            };
            let Some(id) = value.as_str() else {
                return Err(ConfigurationError::InvalidDefine { key: key.clone(), value: value.clone() }.into());
            };

            let localized = if captures.get(1).is_some_and(|kind| kind.as_str() == "MSG") {
                self.translator.translate(id, locale, TRANSLATION_DOMAIN)
            } else {
                self.router.set_locale_context(locale);
                self.router.generate_url(id)?
            };
            *value = Value::String(localized);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::error::{
        Error,
        FilesystemError,
        ResolutionError,
    };
    use crate::services::MemorySink;
    use crate::test_utils::{
        PrefixRouter,
        RecordingTranslator,
    };

    fn config(root: &Path, extra: Value) -> BuildConfig {
        let mut value = json!({
            "id": "app",
            "inputs": ["/src/main.js"],
            "output-file": root.join("js/app-$locale.js").to_string_lossy(),
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut value, extra) {
            base.extend(extra);
        }
        BuildConfig::from_value(value).unwrap()
    }

    fn plan(config: &BuildConfig) -> crate::error::Result<Vec<LocaleConfig>> {
        let translator = RecordingTranslator::default();
        let mut router = PrefixRouter::default();
        let sink = MemorySink::new();
        LocaleBuildPlanner::new(&translator, &mut router, &sink).plan(config)
    }

    #[googletest::test]
    fn plan_defaults_to_english() {
        let temp_dir = TempDir::new().unwrap();

        let planned = plan(&config(temp_dir.path(), json!({}))).unwrap();

        expect_that!(planned, len(eq(1)));
        expect_that!(planned[0].locale(), eq("en"));
        expect_that!(planned[0].output_file(), eq(temp_dir.path().join("js/app-en.js").as_path()));
    }

    #[googletest::test]
    fn plan_follows_declared_locale_order() {
        let temp_dir = TempDir::new().unwrap();

        let planned = plan(&config(temp_dir.path(), json!({"locales": ["en", "fr"]}))).unwrap();

        let outputs: Vec<_> = planned.iter().map(|p| p.output_file().to_path_buf()).collect();
        expect_that!(
            outputs,
            elements_are![
                eq(&temp_dir.path().join("js/app-en.js")),
                eq(&temp_dir.path().join("js/app-fr.js"))
            ]
        );
        expect_that!(planned[1].locale(), eq("fr"));
    }

    #[googletest::test]
    fn plan_strips_output_file_and_locales() {
        let temp_dir = TempDir::new().unwrap();

        let planned = plan(&config(temp_dir.path(), json!({"locales": ["de"]}))).unwrap();

        let config = planned[0].config();
        expect_that!(config.output_file, none());
        expect_that!(config.locales, none());
        expect_that!(config.extra.get("id"), some(eq(&json!("app"))));
        expect_that!(
            config.define.as_ref().unwrap().get("goog.LOCALE"),
            some(eq(&json!("de")))
        );
    }

    #[googletest::test]
    fn plan_creates_and_announces_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path(), json!({
            "output-file": temp_dir.path().join("web/$locale/app.js").to_string_lossy(),
            "locales": ["fr"],
        }));
        let translator = RecordingTranslator::default();
        let mut router = PrefixRouter::default();
        let sink = MemorySink::new();

        LocaleBuildPlanner::new(&translator, &mut router, &sink).plan(&config).unwrap();

        expect_that!(temp_dir.path().join("web/fr").is_dir(), eq(true));
        expect_that!(
            sink.lines(),
            elements_are![eq(&format!(
                "Creating output directory \"{}\"...",
                temp_dir.path().join("web/fr").display()
            ))]
        );
    }

    #[googletest::test]
    fn plan_translates_messages_per_locale() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(temp_dir.path(), json!({
            "locales": ["fr"],
            "define": {"app.MSG_HELLO": "hello.key", "app.DEBUG": false},
        }));
        let translator = RecordingTranslator::default();
        let mut router = PrefixRouter::default();
        let sink = MemorySink::new();

        let planned = LocaleBuildPlanner::new(&translator, &mut router, &sink).plan(&config).unwrap();

        let define = planned[0].config().define.as_ref().unwrap();
        expect_that!(define.get("app.MSG_HELLO"), some(eq(&json!("fr:hello.key"))));
        expect_that!(define.get("app.DEBUG"), some(eq(&json!(false))));
        expect_that!(
            translator.calls(),
            elements_are![eq(&(
                "hello.key".to_string(),
                "fr".to_string(),
                "messages".to_string()
            ))]
        );
    }

    #[googletest::test]
    fn plan_generates_routes_in_locale_context() {
        let temp_dir = TempDir::new().unwrap();

        let planned = plan(&config(temp_dir.path(), json!({
            "locales": ["en", "de"],
            "define": {"app.ROUTE_HOME": "home"},
        })))
        .unwrap();

        let urls: Vec<_> = planned
            .iter()
            .map(|p| p.config().define.as_ref().unwrap()["app.ROUTE_HOME"].clone())
            .collect();
        expect_that!(urls, elements_are![eq(&json!("/en/home")), eq(&json!("/de/home"))]);
    }

    #[rstest]
    #[case("MSG_HELLO")]
    #[case("app.MSG_hello")]
    #[case("app.MSG_HELLO.suffix")]
    #[case("app.ROUTEHOME")]
    fn plan_ignores_non_matching_define_keys(#[case] key: &str) {
        let temp_dir = TempDir::new().unwrap();
        let mut define = Map::new();
        define.insert(key.to_string(), json!("hello.key"));

        let planned = plan(&config(temp_dir.path(), json!({"define": define}))).unwrap();

        assert_eq!(planned[0].config().define.as_ref().unwrap()[key], json!("hello.key"));
    }

    #[googletest::test]
    fn plan_rejects_non_string_message_define() {
        let temp_dir = TempDir::new().unwrap();

        let result = plan(&config(temp_dir.path(), json!({"define": {"app.MSG_COUNT": 3}})));

        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::InvalidDefine { ref key, .. }))
                if key == "app.MSG_COUNT"
        ));
    }

    #[googletest::test]
    fn plan_surfaces_unknown_route() {
        let temp_dir = TempDir::new().unwrap();

        let result = plan(&config(temp_dir.path(), json!({"define": {"app.ROUTE_X": "missing"}})));

        assert!(matches!(
            result,
            Err(Error::Resolution(ResolutionError::UnknownRoute { ref name })) if name == "missing"
        ));
    }

    #[googletest::test]
    fn plan_requires_output_file() {
        let config = BuildConfig::from_value(json!({"inputs": ["main.js"]})).unwrap();

        let result = plan(&config);

        assert!(matches!(result, Err(Error::Configuration(ConfigurationError::MissingOutputFile))));
    }

    #[googletest::test]
    fn plan_fails_when_output_directory_cannot_be_created() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let result = plan(&config(temp_dir.path(), json!({
            "output-file": blocker.join("app.js").to_string_lossy(),
        })));

        assert!(matches!(result, Err(Error::Filesystem(FilesystemError::DirectoryCreation { .. }))));
    }

    #[cfg(unix)]
    #[googletest::test]
    fn plan_fails_when_output_directory_is_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();
        // Permission bits do not bind a privileged user.
        if tempfile::tempfile_in(&locked).is_ok() {
            return;
        }

        let result = plan(&config(temp_dir.path(), json!({
            "output-file": locked.join("app-$locale.js").to_string_lossy(),
        })));

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(
            result,
            Err(Error::Filesystem(FilesystemError::NotWritable { ref path })) if *path == locked
        ));
    }

    #[googletest::test]
    fn plan_chains_shared_rename_maps() {
        let temp_dir = TempDir::new().unwrap();
        let map = temp_dir.path().join("maps/map.txt").to_string_lossy().into_owned();

        let planned = plan(&config(temp_dir.path(), json!({
            "locales": ["en", "fr"],
            "variable-map-output-file": map,
        })))
        .unwrap();

        expect_that!(planned[0].config().variable_map_input_file, none());
        expect_that!(planned[0].config().variable_map_output_file, some(eq(&map)));
        expect_that!(planned[1].config().variable_map_input_file, some(eq(&map)));
        expect_that!(planned[1].config().variable_map_output_file, some(eq(&map)));
        expect_that!(temp_dir.path().join("maps").is_dir(), eq(true));
    }

    #[googletest::test]
    fn plan_keeps_locale_specific_maps_apart() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let planned = plan(&config(root, json!({
            "locales": ["en", "fr"],
            "property-map-input-file": root.join("in/$locale.txt").to_string_lossy(),
            "property-map-output-file": root.join("out/$locale/props.txt").to_string_lossy(),
        })))
        .unwrap();

        let fr = planned[1].config();
        expect_that!(
            fr.property_map_input_file,
            some(eq(&root.join("in/fr.txt").to_string_lossy().into_owned()))
        );
        expect_that!(
            fr.property_map_output_file,
            some(eq(&root.join("out/fr/props.txt").to_string_lossy().into_owned()))
        );
        expect_that!(root.join("out/en").is_dir(), eq(true));
        expect_that!(root.join("out/fr").is_dir(), eq(true));
    }

    #[rstest]
    #[case(Some("/in.txt"), Some("/out.txt"), [(Some("/in.txt"), Some("/out.txt")), (Some("/out.txt"), Some("/out.txt"))])]
    #[case(None, Some("/$locale.txt"), [(None, Some("/en.txt")), (None, Some("/fr.txt"))])]
    #[case(Some("/in.txt"), None, [(Some("/in.txt"), None), (Some("/in.txt"), None)])]
    fn rename_map_chain_advance(
        #[case] input: Option<&str>,
        #[case] output: Option<&str>,
        #[case] expected: [(Option<&str>, Option<&str>); 2],
    ) {
        let mut chain = RenameMapChain::new(input.map(String::from), output.map(String::from));

        for (locale, (want_in, want_out)) in ["en", "fr"].into_iter().zip(expected) {
            let (got_in, got_out) = chain.advance(locale);
            assert_eq!(got_in.as_deref(), want_in);
            assert_eq!(got_out.as_deref(), want_out);
        }
    }
}
