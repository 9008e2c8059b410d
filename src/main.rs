use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use spellgate::checker::runner::ProcessRunner;
use spellgate::checker::{self, BackendKind};
use spellgate::cli::output::{self, OutputFormat};
use spellgate::config::{existing_file, Overrides};
use spellgate::{logging, Check, CheckTarget, Config, SpellingCheck};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spellgate")]
#[command(version, about = "Pre-commit spelling gate backed by hunspell or aspell", long_about = None)]
struct Cli {
    /// Files to check
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Checker backend (hunspell, aspell)
    #[arg(short, long)]
    backend: Option<BackendKind>,

    /// Checker binary to run instead of the backend's default
    #[arg(long, value_name = "PATH")]
    checker: Option<PathBuf>,

    /// Dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long)]
    dictionary: Option<String>,

    /// Input encoding passed to the checker
    #[arg(short = 'i', long)]
    encoding: Option<String>,

    /// Personal dictionary file
    #[arg(short = 'p', long)]
    personal_dict: Option<PathBuf>,

    /// Key for encrypted hunspell dictionaries
    #[arg(short = 'P', long)]
    key: Option<String>,

    /// File with glob patterns of files to skip, one per line
    #[arg(short, long, value_name = "FILE")]
    exclude: Option<PathBuf>,

    /// Seconds to wait for each checker run before killing it
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log checker commands and pass sizes to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Extra arguments forwarded verbatim to the checker
    #[arg(last = true, value_name = "CHECKER_ARGS")]
    checker_args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellgate", &mut io::stdout());
        return Ok(());
    }

    logging::init(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let config = Config::load(
        Overrides {
            backend: cli.backend,
            checker: cli.checker.clone(),
            dictionary: cli.dictionary.clone(),
            encoding: cli.encoding.clone(),
            personal_dictionary: cli.personal_dict.clone(),
            key: cli.key.clone(),
            extra_args: cli.checker_args.clone(),
            exclude_file: cli.exclude.clone(),
            timeout_secs: cli.timeout,
        },
        &cwd,
    )?;

    let backend = checker::build(
        config.backend,
        config.checker.as_deref(),
        &config.checker_options(),
        ProcessRunner::new(config.timeout()),
    );

    // Without the checker there is nothing to do; let the commit through.
    if !backend.is_available() {
        eprintln!(
            "{}",
            spellgate::Error::MissingTool {
                program: backend.program().display().to_string(),
            }
        );
        return Ok(());
    }

    config.validate(&cwd)?;

    let files = cli
        .files
        .iter()
        .map(|path| existing_file(path, &cwd).map(CheckTarget::new))
        .collect::<Result<Vec<_>, _>>()?;

    let check = SpellingCheck::new(backend, config.exclusions(&cwd)?);
    tracing::debug!(check = check.name(), files = files.len(), "starting");

    let colored = !cli.no_color && cli.format == OutputFormat::Text;
    if !colored {
        colored::control::set_override(false);
    }

    let result = check.run(files);
    let code = output::emit(&result, cli.format, colored)?;

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
