use crate::checker::{locate, validate, SpellChecker};
use crate::exclude::ExclusionFilter;
use crate::{CheckTarget, FileFailure, FileReport, RunResult};

/// A pre-commit check over a batch of files.
pub trait Check {
    fn name(&self) -> &'static str;

    fn run(&self, files: Vec<CheckTarget>) -> RunResult;

    /// Run and reduce to an exit status: 0 when every file passed.
    fn check(&self, files: Vec<CheckTarget>) -> i32 {
        self.run(files).exit_code()
    }
}

pub struct SpellingCheck {
    checker: Box<dyn SpellChecker>,
    exclusions: ExclusionFilter,
}

impl SpellingCheck {
    pub fn new(checker: Box<dyn SpellChecker>, exclusions: ExclusionFilter) -> Self {
        Self {
            checker,
            exclusions,
        }
    }

    fn check_file(&self, target: &CheckTarget) -> crate::Result<FileReport> {
        let confirmed = validate::validate(self.checker.as_ref(), &target.path)?;
        let locations = if confirmed.is_empty() {
            Default::default()
        } else {
            locate::locate_file(&target.path, &confirmed)?
        };

        Ok(FileReport {
            target: target.clone(),
            locations,
        })
    }
}

impl Check for SpellingCheck {
    fn name(&self) -> &'static str {
        "spelling"
    }

    fn run(&self, files: Vec<CheckTarget>) -> RunResult {
        let mut result = RunResult {
            base_command: self.checker.base_command().to_string(),
            ..Default::default()
        };

        for target in self.exclusions.filter(files) {
            match self.check_file(&target) {
                Ok(report) => result.reports.push(report),
                Err(error) => {
                    tracing::debug!(file = %target.path.display(), %error, "check failed");
                    result.failures.push(FileFailure { target, error });
                }
            }
        }

        result
    }
}
