use crate::{Error, RunResult};
use colored::*;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonWord<'a> {
    word: &'a str,
    lines: &'a [usize],
}

#[derive(Debug, Serialize)]
struct JsonFile<'a> {
    file: String,
    words: Vec<JsonWord<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonFailure {
    file: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    base_command: &'a str,
    files_checked: usize,
    files_with_errors: usize,
    files: Vec<JsonFile<'a>>,
    failures: Vec<JsonFailure>,
}

/// Print the run to stdout (failures to stderr) and return the exit status.
pub fn emit(result: &RunResult, format: OutputFormat, colored: bool) -> io::Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, result, format, colored)?;
    out.flush()?;

    let stderr = io::stderr();
    let mut err = stderr.lock();
    write_failures(&mut err, result, colored)?;

    Ok(result.exit_code())
}

pub fn write_report<W: Write>(
    out: &mut W,
    result: &RunResult,
    format: OutputFormat,
    colored: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(out, result, colored),
        OutputFormat::Json => write_json(out, result),
    }
}

fn write_text<W: Write>(out: &mut W, result: &RunResult, colored_output: bool) -> io::Result<()> {
    // One header per offending file
    for report in result.reports.iter().filter(|r| !r.is_clean()) {
        writeln!(out, "Base command: {}", result.base_command)?;

        let file_name = report.target.path.display().to_string();
        if colored_output {
            writeln!(out, "{}", file_name.bold().underline())?;
        } else {
            writeln!(out, "{}", file_name)?;
        }

        for (word, lines) in &report.locations {
            let line_word = if lines.len() == 1 { "line" } else { "lines" };
            let numbers = lines
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            if colored_output {
                writeln!(
                    out,
                    "    {}: {} {}",
                    word.red().bold(),
                    line_word,
                    numbers.blue()
                )?;
            } else {
                writeln!(out, "    {}: {} {}", word, line_word, numbers)?;
            }
        }
    }

    Ok(())
}

fn write_json<W: Write>(out: &mut W, result: &RunResult) -> io::Result<()> {
    let files: Vec<JsonFile> = result
        .reports
        .iter()
        .filter(|r| !r.is_clean())
        .map(|r| JsonFile {
            file: r.target.path.display().to_string(),
            words: r
                .locations
                .iter()
                .map(|(word, lines)| JsonWord { word, lines })
                .collect(),
        })
        .collect();

    let output = JsonOutput {
        base_command: &result.base_command,
        files_checked: result.reports.len() + result.failures.len(),
        files_with_errors: files.len(),
        files,
        failures: result
            .failures
            .iter()
            .map(|f| JsonFailure {
                file: f.target.path.display().to_string(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)
}

/// Each failed file with the checker's captured output, for diagnosis.
pub fn write_failures<W: Write>(out: &mut W, result: &RunResult, colored: bool) -> io::Result<()> {
    for failure in &result.failures {
        let file_name = failure.target.path.display().to_string();
        if colored {
            writeln!(out, "{} {}", "error:".red().bold(), file_name.bold())?;
        } else {
            writeln!(out, "error: {}", file_name)?;
        }

        match &failure.error {
            Error::Execution {
                command,
                status,
                stdout,
                stderr,
            } => {
                writeln!(out, "COMMAND: {}", command)?;
                writeln!(out, "STATUS: {}", status)?;
                writeln!(out, "STDOUT:\n{}", stdout.trim_end())?;
                writeln!(out, "STDERR:\n{}", stderr.trim_end())?;
            }
            other => writeln!(out, "{}", other)?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CheckTarget, FileFailure, FileReport, LineLocations};

    fn report(path: &str, words: Vec<(&str, Vec<usize>)>) -> FileReport {
        let locations: LineLocations = words
            .into_iter()
            .map(|(w, lines)| (w.to_string(), lines))
            .collect();
        FileReport {
            target: CheckTarget::new(path),
            locations,
        }
    }

    fn render(result: &RunResult, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, result, format, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_report() {
        let result = RunResult {
            base_command: "hunspell -l".to_string(),
            reports: vec![
                report("/repo/clean.py", vec![]),
                report(
                    "/repo/a.py",
                    vec![("tset", vec![1]), ("Tihs", vec![1]), ("wrod", vec![2, 7])],
                ),
            ],
            failures: Vec::new(),
        };

        assert_eq!(
            render(&result, OutputFormat::Text),
            "Base command: hunspell -l\n\
             /repo/a.py\n\
             \x20   Tihs: line 1\n\
             \x20   tset: line 1\n\
             \x20   wrod: lines 2, 7\n"
        );
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_header_repeats_for_each_offending_file() {
        let result = RunResult {
            base_command: "hunspell -l".to_string(),
            reports: vec![
                report("/repo/a.py", vec![("teh", vec![3])]),
                report("/repo/clean.py", vec![]),
                report("/repo/b.md", vec![("recieve", vec![1, 4])]),
            ],
            failures: Vec::new(),
        };

        assert_eq!(
            render(&result, OutputFormat::Text),
            "Base command: hunspell -l\n\
             /repo/a.py\n\
             \x20   teh: line 3\n\
             Base command: hunspell -l\n\
             /repo/b.md\n\
             \x20   recieve: lines 1, 4\n"
        );
    }

    #[test]
    fn test_clean_run_prints_nothing() {
        let result = RunResult {
            base_command: "hunspell -l".to_string(),
            reports: vec![report("/repo/clean.py", vec![])],
            failures: Vec::new(),
        };

        assert_eq!(render(&result, OutputFormat::Text), "");
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn test_json_report() {
        let result = RunResult {
            base_command: "aspell list".to_string(),
            reports: vec![report("/repo/a.md", vec![("tset", vec![3, 4])])],
            failures: Vec::new(),
        };

        let value: serde_json::Value =
            serde_json::from_str(&render(&result, OutputFormat::Json)).unwrap();
        assert_eq!(value["base_command"], "aspell list");
        assert_eq!(value["files_checked"], 1);
        assert_eq!(value["files"][0]["file"], "/repo/a.md");
        assert_eq!(value["files"][0]["words"][0]["word"], "tset");
        assert_eq!(value["files"][0]["words"][0]["lines"], serde_json::json!([3, 4]));
    }

    #[test]
    fn test_failures_include_captured_output() {
        let result = RunResult {
            base_command: "hunspell -l".to_string(),
            reports: Vec::new(),
            failures: vec![FileFailure {
                target: CheckTarget::new("/repo/bad.txt"),
                error: Error::Execution {
                    command: "hunspell -l /repo/bad.txt".to_string(),
                    status: "exit status: 1".to_string(),
                    stdout: "partial\n".to_string(),
                    stderr: "Can't open affix file\n".to_string(),
                },
            }],
        };

        let mut buf = Vec::new();
        write_failures(&mut buf, &result, false).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("error: /repo/bad.txt\n"));
        assert!(text.contains("COMMAND: hunspell -l /repo/bad.txt\n"));
        assert!(text.contains("STDOUT:\npartial\n"));
        assert!(text.contains("STDERR:\nCan't open affix file\n"));
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
