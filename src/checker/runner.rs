use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// An argv-style command line, optionally fed from a file on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub stdin: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    fn to_command(&self) -> Result<Command> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match &self.stdin {
            Some(path) => {
                let file = File::open(path)
                    .map_err(|e| Error::io("Failed to open checker input", path, e))?;
                command.stdin(Stdio::from(file));
            }
            None => {
                command.stdin(Stdio::null());
            }
        }

        Ok(command)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(path) = &self.stdin {
            write!(f, " < {}", path.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed after the timeout.
    pub status: Option<ExitStatus>,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn lines(&self) -> Vec<String> {
        self.stdout.lines().map(str::to_string).collect()
    }
}

/// Runs checker commands with a wall-clock bound.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `cmd` and return its stdout lines.
    ///
    /// A process that outlives the timeout is killed and whatever it wrote
    /// before that is returned. A process that exits on its own with a
    /// nonzero status is an [`Error::Execution`].
    pub fn run(&self, cmd: &CommandSpec) -> Result<Vec<String>> {
        let output = self.output(cmd)?;

        if output.timed_out {
            tracing::warn!(
                command = %cmd,
                timeout_secs = self.timeout.as_secs_f64(),
                "checker timed out and was killed, using partial output"
            );
            return Ok(output.lines());
        }

        match output.status {
            Some(status) if status.success() => Ok(output.lines()),
            status => Err(Error::Execution {
                command: cmd.to_string(),
                status: status.map_or_else(|| "no status".to_string(), |s| s.to_string()),
                stdout: output.stdout,
                stderr: output.stderr,
            }),
        }
    }

    /// Run `cmd` and collect everything it produced, without judging the exit status.
    pub fn output(&self, cmd: &CommandSpec) -> Result<ProcessOutput> {
        tracing::debug!(command = %cmd, "spawning checker");

        let mut child = cmd.to_command()?.spawn().map_err(|source| Error::Spawn {
            command: cmd.to_string(),
            source,
        })?;

        // Drain both pipes concurrently so the child never blocks on a full buffer.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let (status, timed_out) = match wait_with_deadline(&mut child, self.timeout) {
            Ok(waited) => waited,
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Spawn {
                    command: cmd.to_string(),
                    source,
                });
            }
        };

        Ok(ProcessOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
            status,
            timed_out,
        })
    }
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<(Option<ExitStatus>, bool)> {
    // A timeout too large to represent never expires
    let deadline = Instant::now().checked_add(timeout);

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((Some(status), false));
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    // The child may exit between the last poll and the kill.
    if let Err(e) = child.kill() {
        if e.kind() != std::io::ErrorKind::InvalidInput {
            return Err(e);
        }
    }
    child.wait()?;
    Ok((None, true))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            // A read error leaves whatever arrived before it.
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Locate `program` the way a shell would, honoring explicit paths.
pub fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".EXE;.CMD;.BAT".to_string());
    let mut out = vec![dir.join(program)];
    for ext in exts.split(';').filter(|e| !e.is_empty()) {
        let mut name = program.as_os_str().to_os_string();
        name.push(ext);
        out.push(dir.join(name));
    }
    out
}

#[cfg(not(windows))]
fn candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    vec![dir.join(program)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn test_captures_stdout_lines() {
        let runner = ProcessRunner::default();
        let lines = runner.run(&sh("printf 'alpha\\nbeta\\n'")).unwrap();
        assert_eq!(lines, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_no_trailing_empty_line() {
        let runner = ProcessRunner::default();
        let lines = runner.run(&sh("echo only")).unwrap();
        assert_eq!(lines, vec!["only"]);
    }

    #[test]
    fn test_nonzero_exit_is_execution_error() {
        let runner = ProcessRunner::default();
        let err = runner
            .run(&sh("echo out; echo boom >&2; exit 3"))
            .unwrap_err();

        match err {
            Error::Execution {
                command,
                stdout,
                stderr,
                ..
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(stdout.trim(), "out");
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_kills_and_returns_partial_output() {
        let runner = ProcessRunner::new(Duration::from_millis(300));
        let started = Instant::now();
        let lines = runner.run(&sh("echo partial; exec sleep 10")).unwrap();

        assert_eq!(lines, vec!["partial"]);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_unbounded_timeout_waits_for_exit() {
        let runner = ProcessRunner::new(Duration::from_secs(u64::MAX));
        let lines = runner.run(&sh("echo done")).unwrap();
        assert_eq!(lines, vec!["done"]);
    }

    #[test]
    fn test_stdin_from_file() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "from stdin").unwrap();

        let runner = ProcessRunner::default();
        let cmd = CommandSpec::new("cat").stdin_file(input.path());
        assert_eq!(runner.run(&cmd).unwrap(), vec!["from stdin"]);
    }

    #[test]
    fn test_spawn_failure() {
        let runner = ProcessRunner::default();
        let err = runner
            .run(&CommandSpec::new("/nonexistent/definitely-not-here"))
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[test]
    fn test_display_joins_argv() {
        let cmd = CommandSpec::new("hunspell").args(["-d", "en_US", "-l"]);
        assert_eq!(cmd.to_string(), "hunspell -d en_US -l");
    }

    #[test]
    fn test_find_executable() {
        assert!(find_executable(Path::new("sh")).is_some());
        assert!(find_executable(Path::new("no-such-checker-binary-xyz")).is_none());
        assert!(find_executable(Path::new("/nonexistent/hunspell")).is_none());
    }
}
