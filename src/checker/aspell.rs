use super::normalize::Normalizer;
use super::runner::{CommandSpec, ProcessRunner};
use super::{CheckerOptions, SpellChecker};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// aspell in list mode, reading the file on stdin: `aspell list [opts] < file`.
#[derive(Debug, Clone)]
pub struct Aspell {
    program: PathBuf,
    args: Vec<String>,
    runner: ProcessRunner,
}

impl Aspell {
    pub fn new(program: impl Into<PathBuf>, options: &CheckerOptions, runner: ProcessRunner) -> Self {
        let mut args = vec!["list".to_string()];
        args.extend(options.extra_args.iter().cloned());
        if let Some(dictionary) = &options.dictionary {
            args.push(format!("--lang={dictionary}"));
        }
        if let Some(encoding) = &options.encoding {
            args.push(format!("--encoding={encoding}"));
        }
        if let Some(personal) = &options.personal_dictionary {
            args.push(format!("--personal={}", personal.display()));
        }
        if options.key.is_some() {
            tracing::warn!("aspell has no dictionary key option, ignoring it");
        }

        Self {
            program: program.into(),
            args,
            runner,
        }
    }
}

impl SpellChecker for Aspell {
    fn program(&self) -> &Path {
        &self.program
    }

    fn base_command(&self) -> CommandSpec {
        CommandSpec::new(&self.program).args(&self.args)
    }

    fn list_misspelled(&self, file: &Path) -> Result<Vec<String>> {
        self.runner.run(&self.base_command().stdin_file(file))
    }

    fn normalizer(&self) -> Normalizer {
        Normalizer::Quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_become_long_flags() {
        let options = CheckerOptions {
            dictionary: Some("en_GB".to_string()),
            encoding: None,
            personal_dictionary: Some(PathBuf::from("/repo/.aspell.pws")),
            key: None,
            extra_args: vec!["--mode=none".to_string()],
        };
        let checker = Aspell::new("aspell", &options, ProcessRunner::default());

        assert_eq!(
            checker.base_command().to_string(),
            "aspell list --mode=none --lang=en_GB --personal=/repo/.aspell.pws"
        );
        assert_eq!(checker.normalizer(), Normalizer::Quotes);
    }
}
