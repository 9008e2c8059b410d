use super::normalize::Normalizer;
use super::runner::{CommandSpec, ProcessRunner};
use super::{CheckerOptions, SpellChecker};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// hunspell in list mode: `hunspell [opts] -l <file>`.
#[derive(Debug, Clone)]
pub struct Hunspell {
    program: PathBuf,
    args: Vec<String>,
    runner: ProcessRunner,
}

impl Hunspell {
    pub fn new(program: impl Into<PathBuf>, options: &CheckerOptions, runner: ProcessRunner) -> Self {
        let mut args = options.extra_args.clone();
        if let Some(dictionary) = &options.dictionary {
            args.extend(["-d".to_string(), dictionary.clone()]);
        }
        if let Some(encoding) = &options.encoding {
            args.extend(["-i".to_string(), encoding.clone()]);
        }
        if let Some(personal) = &options.personal_dictionary {
            args.extend(["-p".to_string(), personal.display().to_string()]);
        }
        if let Some(key) = &options.key {
            args.extend(["-P".to_string(), key.clone()]);
        }
        args.push("-l".to_string());

        Self {
            program: program.into(),
            args,
            runner,
        }
    }
}

impl SpellChecker for Hunspell {
    fn program(&self) -> &Path {
        &self.program
    }

    fn base_command(&self) -> CommandSpec {
        CommandSpec::new(&self.program).args(&self.args)
    }

    fn list_misspelled(&self, file: &Path) -> Result<Vec<String>> {
        self.runner.run(&self.base_command().arg(file))
    }

    fn normalizer(&self) -> Normalizer {
        Normalizer::AlphabeticRun
    }
}
