//! Subprocess execution seam

use proto_client_gen_common::{PipelineError, Result};
use std::path::PathBuf;
use std::process::Command;

/// One compiler or locator invocation: executable, ordered arguments,
/// optional working directory. Built deterministically, never mutated
/// afterwards, executed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
        }
    }

    pub fn in_dir(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    /// Human-readable command line for error messages
    pub fn rendered(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Executes external commands on behalf of the engine.
///
/// All compiler and locator invocations go through this trait so tests
/// can substitute a recording or mock implementation and assert on the
/// exact invocations without touching a real protoc.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run a command to completion, discarding its output. A non-zero
    /// exit status is an error.
    fn run(&self, invocation: &Invocation) -> Result<()>;

    /// Run a command and return its trimmed stdout. A non-zero exit
    /// status is an error.
    fn capture(&self, invocation: &Invocation) -> Result<String>;
}

/// Blocking runner backed by `std::process::Command`
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let status = Self::command(invocation).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::CompilerInvocationFailed {
                command: invocation.rendered(),
                status: status.to_string(),
            })
        }
    }

    fn capture(&self, invocation: &Invocation) -> Result<String> {
        let output = Self::command(invocation).output()?;
        if !output.status.success() {
            return Err(PipelineError::CompilerInvocationFailed {
                command: invocation.rendered(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}
