use crate::policy::PolicyOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// File the CLI looks for in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ironframe-lint.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "cssFile")]
    pub css_file: String,
    #[serde(alias = "allowArbitraryValues")]
    pub allow_arbitrary_values: bool,
    #[serde(alias = "customClasses")]
    pub custom_classes: Vec<String>,
    pub debug: bool,
    #[serde(alias = "suppressOverriddenDefaults")]
    pub suppress_overridden_defaults: bool,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    #[default]
    Stylesheets,
    BuildTool,
}

/// How the vocabulary is produced. `command` and `args` only apply to
/// [`SourceKind::BuildTool`]; `{input}` and `{output}` in `args` are replaced
/// with the stylesheet path and a temporary output path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub message: String,
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|err| ConfigError {
        message: format!("failed to read config {}: {}", path.display(), err),
    })?;
    toml::from_str(&text).map_err(|err| ConfigError {
        message: format!("failed to parse config {}: {}", path.display(), err),
    })
}

/// Loads `path` when given, otherwise the default config file in `root` if it
/// exists, otherwise the defaults.
pub fn load_or_default(path: Option<&Path>, root: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load(path);
    }
    let candidate = root.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        return load(&candidate);
    }
    Ok(Config::default())
}

impl Config {
    pub fn policy_options(&self) -> PolicyOptions {
        PolicyOptions {
            allow_arbitrary_values: self.allow_arbitrary_values,
            suppress_overridden_defaults: self.suppress_overridden_defaults,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            css_file: "src/styles/globals.css".to_string(),
            allow_arbitrary_values: true,
            custom_classes: Vec::new(),
            debug: false,
            suppress_overridden_defaults: true,
            source: SourceConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Stylesheets,
            command: "npx".to_string(),
            args: ["@tailwindcss/cli", "-i", "{input}", "-o", "{output}"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}
