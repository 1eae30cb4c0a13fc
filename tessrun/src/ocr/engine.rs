use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Result, TessError};

/// Where the engine should put its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to standard output (Tesseract's `stdout` output base).
    Stdout,
    /// Write to `<base>.txt`.
    Base(PathBuf),
}

/// A fully resolved engine call: `<input> <output> [args...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInvocation {
    pub input: PathBuf,
    pub output: OutputTarget,
    pub args: Vec<String>,
}

impl EngineInvocation {
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        argv.push(self.input.clone().into_os_string());
        argv.push(match &self.output {
            OutputTarget::Stdout => OsString::from("stdout"),
            OutputTarget::Base(base) => base.clone().into_os_string(),
        });
        argv.extend(self.args.iter().map(OsString::from));
        argv
    }
}

/// What came back from one engine run.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub success: bool,
    /// Human-readable exit status, e.g. `exit status: 1`.
    pub status: String,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl EngineOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Capability for running an OCR engine.
///
/// A run only fails with `Err` when the engine could not be started at all;
/// a non-zero exit is reported through `EngineOutput::success`.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, invocation: &EngineInvocation) -> Result<EngineOutput>;
}

/// Runs the `tesseract` command-line binary.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.binary)
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    fn execute<I, S>(&self, args: I) -> Result<EngineOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => TessError::EngineNotFound {
                    binary: self.binary.display().to_string(),
                },
                _ => TessError::Io(e),
            })?;

        Ok(EngineOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn query(&self, flag: &str) -> Result<String> {
        let output = self.execute([flag])?;
        if !output.success {
            return Err(TessError::EngineFailed {
                status: output.status.clone(),
                stderr: output.stderr_lossy(),
            });
        }
        Ok(String::from_utf8(output.stdout)?)
    }

    /// First line of `tesseract --version`, e.g. `tesseract 5.3.4`.
    pub fn version(&self) -> Result<String> {
        let text = self.query("--version")?;
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    pub fn is_available(&self) -> bool {
        self.version().is_ok()
    }

    /// Installed language models, from `--list-langs`.
    pub fn list_languages(&self) -> Result<Vec<String>> {
        let text = self.query("--list-langs")?;
        Ok(text
            .lines()
            .filter(|line| !line.starts_with("List of available languages"))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// The engine's tunable parameters, as listed by `--print-parameters`.
    pub fn print_parameters(&self) -> Result<String> {
        self.query("--print-parameters")
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn run(&self, invocation: &EngineInvocation) -> Result<EngineOutput> {
        let argv = invocation.argv();
        debug!(binary = %self.binary.display(), args = ?argv, "Running OCR engine");
        self.execute(argv)
    }
}
