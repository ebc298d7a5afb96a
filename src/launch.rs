use std::fmt;
use std::io;
use std::process::Command;

use thiserror::Error;

use crate::theme::Theme;

/// Verb the external command expects before the theme name.
pub const VERB: &str = "activate";

/// Status reported for a command that never started, as a shell would.
pub const LAUNCH_FAILURE_STATUS: i32 = 127;

/// How to reach the external theming command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Bare name resolved on `PATH`, or a path to the executable.
    pub command: String,
    /// Generic launcher such as `/usr/bin/env` that gets `command` as its
    /// first argument.
    pub launcher: Option<String>,
    /// Forwarded verbatim after `activate <theme>`.
    pub extra_args: Vec<String>,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            launcher: None,
            extra_args: Vec::new(),
        }
    }

    pub fn invocation(&self, theme: Theme) -> Invocation {
        let mut args = Vec::with_capacity(self.extra_args.len() + 3);
        let program = match &self.launcher {
            Some(launcher) => {
                args.push(self.command.clone());
                launcher.clone()
            }
            None => self.command.clone(),
        };
        args.push(VERB.to_string());
        args.push(theme.as_str().to_string());
        args.extend(self.extra_args.iter().cloned());
        Invocation { program, args }
    }
}

/// One run of the external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("command not found: {program}")]
    NotFound { program: String },
    #[error("permission denied: {program}")]
    PermissionDenied { program: String },
    #[error("failed to launch {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    fn from_io(program: &str, err: io::Error) -> Self {
        let program = program.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound { program },
            io::ErrorKind::PermissionDenied => LaunchError::PermissionDenied { program },
            _ => LaunchError::Io {
                program,
                source: err,
            },
        }
    }
}

/// Runs an invocation to completion.
///
/// Returns the child's exit code, or `None` if it was killed by a signal.
pub trait Launcher: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<Option<i32>, LaunchError>;
}

/// Spawns a real child that inherits our environment and stdio, and blocks
/// until it exits.
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn run(&self, invocation: &Invocation) -> Result<Option<i32>, LaunchError> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|e| LaunchError::from_io(&invocation.program, e))?;
        Ok(status.code())
    }
}
