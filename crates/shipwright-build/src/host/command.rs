//! Compile step backed by a shell command

use super::{CompileOutcome, CompileReport, CompileRequest, Compiler};
use crate::error::{BuildError, BuildResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Runs a configured shell command as the compile step
///
/// The command runs through `sh -c` in the project root. The request is
/// passed through `SHIPWRIGHT_*` environment variables. Exit status 0 means
/// success; output lines starting with `warning:` or `error:` are counted.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: String,
    working_dir: PathBuf,
}

/// Captured output of one compile command
#[derive(Debug)]
struct CommandOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl CommandCompiler {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Environment handed to the command
    pub fn environment(request: &CompileRequest) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(
            "SHIPWRIGHT_PLATFORM".to_string(),
            request.platform.name().to_string(),
        );
        env.insert(
            "SHIPWRIGHT_OUTPUT_PATH".to_string(),
            request.output_path.display().to_string(),
        );
        env.insert("SHIPWRIGHT_SCENES".to_string(), request.scenes.join(";"));
        env.insert("SHIPWRIGHT_OPTIONS".to_string(), request.options.join(";"));
        env.insert("SHIPWRIGHT_SYMBOLS".to_string(), request.symbols.join(";"));
        env
    }

    fn run(&self, request: &CompileRequest) -> BuildResult<CommandOutput> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.working_dir)
            .envs(Self::environment(request))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BuildError::CompilerUnavailable(e.to_string()))?
            .wait_with_output()
            .map_err(|e| BuildError::CompilerUnavailable(e.to_string()))?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Count `warning:` and `error:` lines
fn count_diagnostics(text: &str) -> (usize, usize) {
    let mut errors = 0;
    let mut warnings = 0;
    for line in text.lines() {
        let line = line.trim_start().to_lowercase();
        if line.starts_with("error:") {
            errors += 1;
        } else if line.starts_with("warning:") {
            warnings += 1;
        }
    }
    (errors, warnings)
}

impl Compiler for CommandCompiler {
    fn compile(&self, request: &CompileRequest) -> BuildResult<CompileReport> {
        info!(
            command = %self.command,
            platform = %request.platform,
            output = %request.output_path.display(),
            "running compile command"
        );

        let output = self.run(request)?;
        if !output.stdout.is_empty() {
            debug!("{}", output.stdout.trim_end());
        }
        if !output.stderr.is_empty() {
            debug!("{}", output.stderr.trim_end());
        }

        let (out_errors, out_warnings) = count_diagnostics(&output.stdout);
        let (err_errors, err_warnings) = count_diagnostics(&output.stderr);
        let mut errors = out_errors + err_errors;
        let warnings = out_warnings + err_warnings;

        let outcome = if output.exit_code == 0 {
            CompileOutcome::Succeeded
        } else {
            errors = errors.max(1);
            CompileOutcome::Failed
        };

        Ok(CompileReport {
            outcome,
            errors,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipwright_config::Platform;
    use std::path::Path;
    use tempfile::TempDir;

    fn request(output: &Path) -> CompileRequest {
        CompileRequest {
            scenes: vec!["Scenes/A.scene".to_string(), "Scenes/B.scene".to_string()],
            platform: Platform::Linux64,
            output_path: output.to_path_buf(),
            options: vec!["development".to_string()],
            symbols: vec!["TL_BUILD_DEV".to_string()],
        }
    }

    #[test]
    fn test_count_diagnostics() {
        let text = "warning: unused\nerror: broken\n  Error: also broken\nnote: fine\n";
        assert_eq!(count_diagnostics(text), (2, 1));
    }

    #[test]
    fn test_environment() {
        let env = CommandCompiler::environment(&request(Path::new("/out/Game")));
        assert_eq!(env["SHIPWRIGHT_PLATFORM"], "linux64");
        assert_eq!(env["SHIPWRIGHT_SCENES"], "Scenes/A.scene;Scenes/B.scene");
        assert_eq!(env["SHIPWRIGHT_SYMBOLS"], "TL_BUILD_DEV");
        assert_eq!(env["SHIPWRIGHT_OPTIONS"], "development");
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command() {
        let temp = TempDir::new().unwrap();
        let compiler = CommandCompiler::new(
            "echo \"warning: slow shader\"; printf '%s' \"$SHIPWRIGHT_PLATFORM\" > platform.txt",
            temp.path(),
        );

        let report = compiler.compile(&request(&temp.path().join("Game"))).unwrap();
        assert!(report.is_success());
        assert_eq!(report.warnings, 1);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("platform.txt")).unwrap(),
            "linux64"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_at_least_one_error() {
        let temp = TempDir::new().unwrap();
        let compiler = CommandCompiler::new("exit 3", temp.path());

        let report = compiler.compile(&request(&temp.path().join("Game"))).unwrap();
        assert_eq!(report.outcome, CompileOutcome::Failed);
        assert_eq!(report.errors, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_counts_errors() {
        let temp = TempDir::new().unwrap();
        let compiler = CommandCompiler::new(
            "echo 'error: one' >&2; echo 'error: two' >&2; exit 1",
            temp.path(),
        );

        let report = compiler.compile(&request(&temp.path().join("Game"))).unwrap();
        assert_eq!(report, CompileReport::failed(2, 0));
    }
}
