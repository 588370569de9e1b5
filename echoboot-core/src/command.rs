//! Invoking the external tools that partition drives and install bootloaders.
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// A program and its arguments, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Shorthand for a path argument.
    pub fn path(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands.
///
/// Implementations must treat a non-zero exit status as
/// [`Error::CommandFailure`]; orchestration stops at the first one.
pub trait CommandRunner {
    /// Runs `command` to completion and returns its trimmed stdout.
    fn run(&mut self, command: &CommandSpec) -> Result<String>;
}

/// Spawns real processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &CommandSpec) -> Result<String> {
        log::debug!("Running: {command}");
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::CommandFailure {
                    command: command.to_string(),
                    stderr: format!("command not found: {}", command.program),
                },
                _ => Error::CommandFailure {
                    command: command.to_string(),
                    stderr: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailure {
                command: command.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_displays_as_a_command_line() {
        let spec = CommandSpec::new("parted")
            .args(["-s", "/dev/sdb", "mklabel", "gpt"]);
        assert_eq!(spec.to_string(), "parted -s /dev/sdb mklabel gpt");
    }

    #[test]
    fn missing_program_is_a_command_failure() {
        let err = SystemRunner
            .run(&CommandSpec::new("echoboot-definitely-not-installed"))
            .unwrap_err();
        match err {
            Error::CommandFailure { stderr, .. } => assert!(stderr.contains("command not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_command_failure() {
        let err = SystemRunner.run(&CommandSpec::new("false")).unwrap_err();
        assert!(matches!(err, Error::CommandFailure { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_returned_trimmed() {
        let out = SystemRunner
            .run(&CommandSpec::new("echo").arg("BOOT"))
            .unwrap();
        assert_eq!(out, "BOOT");
    }
}
