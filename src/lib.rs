pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod exclude;
pub mod hook;
pub mod logging;

pub use checker::SpellChecker;
pub use config::Config;
pub use error::{Error, Result};
pub use hook::{Check, SpellingCheck};

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Confirmed word → 1-based line numbers, in the order they were found.
pub type LineLocations = BTreeMap<String, Vec<usize>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    pub path: PathBuf,
    /// Comment leader for checks that care about it; spelling treats lines as opaque.
    pub comment_marker: Option<String>,
}

impl CheckTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            comment_marker: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub target: CheckTarget,
    pub locations: LineLocations,
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.locations.is_empty()
    }
}

#[derive(Debug)]
pub struct FileFailure {
    pub target: CheckTarget,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub base_command: String,
    pub reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl RunResult {
    pub fn has_violations(&self) -> bool {
        self.reports.iter().any(|r| !r.is_clean())
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_violations() || !self.failures.is_empty() {
            1
        } else {
            0
        }
    }
}
