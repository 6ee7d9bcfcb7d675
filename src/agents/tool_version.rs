use crate::agents::process::{describe_status, spawn_with_retry};
use crate::agents::virtual_env::ActiveEnvironment;
use crate::error::{Result, UpdaterError};
use std::io::{self, Write};
use std::process::Stdio;

/// ToolVersionAgent asks the upgraded tool for its version
pub struct ToolVersionAgent<'a> {
    env: &'a ActiveEnvironment,
}

impl<'a> ToolVersionAgent<'a> {
    pub fn new(env: &'a ActiveEnvironment) -> Self {
        Self { env }
    }

    /// Runs `tool args...`, relays its stdout verbatim, and returns it trimmed.
    pub fn report<S: AsRef<str>>(&self, tool: &str, args: &[S]) -> Result<String> {
        let mut command = self.env.command(tool);
        for arg in args {
            let arg: &str = arg.as_ref();
            command.arg(arg);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let child = spawn_with_retry(&mut command, tool)?;
        let output = child.wait_with_output()?;

        let mut out = io::stdout().lock();
        out.write_all(&output.stdout)?;
        out.flush()?;

        if !output.status.success() {
            return Err(UpdaterError::VersionReport {
                message: format!("{tool} {}", describe_status(&output.status)),
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
