use crate::checker::runner::DEFAULT_TIMEOUT;
use crate::checker::{BackendKind, CheckerOptions};
use crate::exclude::{absolute_path, absolute_pattern, ExclusionFilter};
use crate::Error;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LOCAL_CONFIG: &str = ".spellgate.toml";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub backend: BackendKind,
    /// Checker binary; defaults to the backend's own name.
    pub checker: Option<PathBuf>,
    pub dictionary: Option<String>,
    pub encoding: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    /// hunspell `-P` key for encrypted dictionaries.
    pub key: Option<String>,
    pub extra_args: Vec<String>,
    pub exclude: Vec<String>,
    pub exclude_file: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            checker: None,
            dictionary: None,
            encoding: None,
            personal_dictionary: None,
            key: None,
            extra_args: Vec::new(),
            exclude: Vec::new(),
            exclude_file: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// One config file as written: every key it sets, and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub backend: Option<BackendKind>,
    pub checker: Option<PathBuf>,
    pub dictionary: Option<String>,
    pub encoding: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub key: Option<String>,
    pub extra_args: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub exclude_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values given on the command line, which win over every config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<BackendKind>,
    pub checker: Option<PathBuf>,
    pub dictionary: Option<String>,
    pub encoding: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub key: Option<String>,
    pub extra_args: Vec<String>,
    pub exclude_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    ///
    /// Relative paths are anchored at `cwd` but not checked for existence;
    /// call [`Config::validate`] once the checker is known to be installed.
    pub fn load(overrides: Overrides, cwd: &Path) -> Result<Self> {
        Self::load_with_global(Self::global_config_path().as_deref(), overrides, cwd)
    }

    pub fn load_with_global(
        global_path: Option<&Path>,
        overrides: Overrides,
        cwd: &Path,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                config = config.merge(ConfigLayer::from_file(global_path)?);
            }
        }

        // Load local config (overrides global)
        let local_path = cwd.join(LOCAL_CONFIG);
        if local_path.exists() {
            config = config.merge(ConfigLayer::from_file(&local_path)?);
        }

        let mut config = config.apply(overrides);
        config.personal_dictionary = config.personal_dictionary.map(|p| absolute_path(&p, cwd));
        config.exclude_file = config.exclude_file.map(|p| absolute_path(&p, cwd));
        Ok(config)
    }

    fn merge(mut self, layer: ConfigLayer) -> Self {
        // Every key the layer sets wins, even when it restates a default
        if let Some(backend) = layer.backend {
            self.backend = backend;
        }
        if let Some(checker) = layer.checker {
            self.checker = Some(checker);
        }
        if let Some(dictionary) = layer.dictionary {
            self.dictionary = Some(dictionary);
        }
        if let Some(encoding) = layer.encoding {
            self.encoding = Some(encoding);
        }
        if let Some(personal) = layer.personal_dictionary {
            self.personal_dictionary = Some(personal);
        }
        if let Some(key) = layer.key {
            self.key = Some(key);
        }
        if let Some(extra_args) = layer.extra_args {
            self.extra_args = extra_args;
        }
        if let Some(exclude) = layer.exclude {
            self.exclude = exclude;
        }
        if let Some(exclude_file) = layer.exclude_file {
            self.exclude_file = Some(exclude_file);
        }
        if let Some(timeout) = layer.timeout_secs {
            self.timeout_secs = timeout;
        }
        self
    }

    fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(checker) = overrides.checker {
            self.checker = Some(checker);
        }
        if let Some(dictionary) = overrides.dictionary {
            self.dictionary = Some(dictionary);
        }
        if let Some(encoding) = overrides.encoding {
            self.encoding = Some(encoding);
        }
        if let Some(personal) = overrides.personal_dictionary {
            self.personal_dictionary = Some(personal);
        }
        if let Some(key) = overrides.key {
            self.key = Some(key);
        }
        if !overrides.extra_args.is_empty() {
            self.extra_args.extend(overrides.extra_args);
        }
        if let Some(exclude_file) = overrides.exclude_file {
            self.exclude_file = Some(exclude_file);
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        self
    }

    /// Require the personal dictionary and exclusion file to exist.
    pub fn validate(&self, cwd: &Path) -> Result<()> {
        for path in [&self.personal_dictionary, &self.exclude_file].into_iter().flatten() {
            existing_file(path, cwd)?;
        }
        if self.timeout_secs == 0 {
            return Err(Error::Configuration("timeout must be at least one second".to_string()).into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn checker_options(&self) -> CheckerOptions {
        CheckerOptions {
            dictionary: self.dictionary.clone(),
            encoding: self.encoding.clone(),
            personal_dictionary: self.personal_dictionary.clone(),
            key: self.key.clone(),
            extra_args: self.extra_args.clone(),
        }
    }

    /// Patterns from the config list and the exclusion file, combined.
    pub fn exclusions(&self, cwd: &Path) -> Result<ExclusionFilter> {
        let mut filter =
            ExclusionFilter::new(self.exclude.iter().map(|p| absolute_pattern(p.trim(), cwd)))?;
        if let Some(path) = &self.exclude_file {
            filter.extend(ExclusionFilter::from_file(path, cwd)?);
        }
        Ok(filter)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellgate").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Make `path` absolute against `cwd` and insist that it exists.
pub fn existing_file(path: &Path, cwd: &Path) -> std::result::Result<PathBuf, Error> {
    let absolute = absolute_path(path, cwd);
    if !absolute.exists() {
        return Err(Error::Configuration(format!(
            "File {} does not exist",
            absolute.display()
        )));
    }
    Ok(absolute)
}
