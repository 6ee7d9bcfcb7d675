use crate::error::{Result, UpdaterError};
use std::process::{Child, Command, ExitStatus};
use std::time::Duration;

const SPAWN_ATTEMPTS: u32 = 5;

/// Spawns the command, retrying briefly while the executable is still open for writing elsewhere.
pub fn spawn_with_retry(command: &mut Command, program: &str) -> Result<Child> {
    let mut backoff = Duration::from_millis(2);
    let mut attempt = 1;
    loop {
        match command.spawn() {
            Ok(child) => return Ok(child),
            Err(source) => {
                let is_busy = matches!(source.kind(), std::io::ErrorKind::ExecutableFileBusy)
                    || source.raw_os_error() == Some(26);
                if is_busy && attempt < SPAWN_ATTEMPTS {
                    attempt += 1;
                    std::thread::sleep(backoff);
                    backoff = std::cmp::min(backoff * 2, Duration::from_millis(50));
                    continue;
                }
                return Err(UpdaterError::Spawn {
                    program: program.to_string(),
                    source,
                });
            }
        }
    }
}

/// Human-readable reason a child did not succeed.
pub fn describe_status(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exited with code {code}");
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("terminated by signal {signal}");
        }
    }

    "terminated without an exit code".to_string()
}
