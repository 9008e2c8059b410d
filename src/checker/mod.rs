pub mod aspell;
pub mod hunspell;
pub mod locate;
pub mod normalize;
pub mod runner;
pub mod validate;

use crate::error::Result;
use normalize::Normalizer;
use runner::{CommandSpec, ProcessRunner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use aspell::Aspell;
pub use hunspell::Hunspell;

/// An external spell checker reached through a process boundary.
pub trait SpellChecker {
    /// The binary this backend invokes.
    fn program(&self) -> &Path;

    /// Command line shared by every invocation, without the input file.
    fn base_command(&self) -> CommandSpec;

    /// Raw tokens the checker flags as misspelled in `file`, one per output line.
    fn list_misspelled(&self, file: &Path) -> Result<Vec<String>>;

    fn normalizer(&self) -> Normalizer;

    fn normalize(&self, word: &str) -> String {
        self.normalizer().normalize(word)
    }

    fn is_available(&self) -> bool {
        runner::find_executable(self.program()).is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Hunspell,
    Aspell,
}

impl BackendKind {
    pub fn default_program(self) -> &'static str {
        match self {
            BackendKind::Hunspell => "hunspell",
            BackendKind::Aspell => "aspell",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hunspell" => Ok(BackendKind::Hunspell),
            "aspell" => Ok(BackendKind::Aspell),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

/// Checker settings forwarded to whichever backend is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckerOptions {
    pub dictionary: Option<String>,
    pub encoding: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub key: Option<String>,
    pub extra_args: Vec<String>,
}

/// Build the configured backend.
pub fn build(
    kind: BackendKind,
    program: Option<&Path>,
    options: &CheckerOptions,
    runner: ProcessRunner,
) -> Box<dyn SpellChecker> {
    let program = program
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(kind.default_program()));

    match kind {
        BackendKind::Hunspell => Box::new(Hunspell::new(program, options, runner)),
        BackendKind::Aspell => Box::new(Aspell::new(program, options, runner)),
    }
}
