use crate::agents::process::{describe_status, spawn_with_retry};
use crate::agents::virtual_env::ActiveEnvironment;
use crate::error::{Result, UpdaterError};
use regex::Regex;
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::process::Stdio;
use std::sync::LazyLock;

pub const PACKAGE_MANAGER: &str = "pip";

static SUCCESSFULLY_INSTALLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Successfully installed (.+?)\s*$").expect("install pattern is valid")
});

static ALREADY_SATISFIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Requirement already satisfied: ([A-Za-z0-9._-]+) in .*\(([^)]+)\)\s*$")
        .expect("requirement pattern is valid")
});

static EXISTING_INSTALLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Found existing installation: ([A-Za-z0-9._-]+) (\S+)")
        .expect("existing installation pattern is valid")
});

/// What the package manager reported about the upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    Upgraded { from: Option<String>, to: String },
    AlreadyLatest { version: String },
    Unknown,
}

impl UpgradeOutcome {
    /// Scan pip's stdout for the requested package. Unrecognised output yields `Unknown`.
    pub fn parse<S: AsRef<str>>(package: &str, lines: &[S]) -> Self {
        let wanted = normalize_name(package);
        let mut from = None;
        let mut to = None;
        let mut current = None;

        for line in lines {
            let line = line.as_ref();

            if let Some(caps) = EXISTING_INSTALLATION.captures(line) {
                if normalize_name(&caps[1]) == wanted {
                    from = Some(caps[2].to_string());
                }
            } else if let Some(caps) = ALREADY_SATISFIED.captures(line) {
                if normalize_name(&caps[1]) == wanted {
                    current = Some(caps[2].to_string());
                }
            } else if let Some(caps) = SUCCESSFULLY_INSTALLED.captures(line) {
                to = caps[1]
                    .split_whitespace()
                    .filter_map(|dist| dist.rsplit_once('-'))
                    .find(|(name, _)| normalize_name(name) == wanted)
                    .map(|(_, version)| version.to_string());
            }
        }

        match (to, current) {
            (Some(to), _) => UpgradeOutcome::Upgraded { from, to },
            (None, Some(version)) => UpgradeOutcome::AlreadyLatest { version },
            (None, None) => UpgradeOutcome::Unknown,
        }
    }
}

impl fmt::Display for UpgradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeOutcome::Upgraded {
                from: Some(from),
                to,
            } => write!(f, "upgraded {from} → {to}"),
            UpgradeOutcome::Upgraded { from: None, to } => write!(f, "installed {to}"),
            UpgradeOutcome::AlreadyLatest { version } => write!(f, "already at {version}"),
            UpgradeOutcome::Unknown => f.write_str("no change reported"),
        }
    }
}

/// Distribution names compare case-insensitively with `_` and `.` equivalent to `-`.
fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(['_', '.'], "-")
}

/// PackageManagerAgent runs pip inside the active environment
pub struct PackageManagerAgent<'a> {
    env: &'a ActiveEnvironment,
}

impl<'a> PackageManagerAgent<'a> {
    pub fn new(env: &'a ActiveEnvironment) -> Self {
        Self { env }
    }

    /// Upgrade `package` to its latest release.
    pub fn upgrade(&self, package: &str) -> Result<UpgradeOutcome> {
        let args = ["install", "--upgrade", package];
        let lines = self.execute_pip_command(&args)?;
        let outcome = UpgradeOutcome::parse(package, &lines);
        tracing::debug!(%outcome, "pip finished");
        Ok(outcome)
    }

    /// Runs pip, streaming stdout to the terminal while keeping a copy for parsing.
    fn execute_pip_command(&self, args: &[&str]) -> Result<Vec<String>> {
        println!("Executing: {} {}", PACKAGE_MANAGER, args.join(" "));

        let mut command = self.env.command(PACKAGE_MANAGER);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = spawn_with_retry(&mut command, PACKAGE_MANAGER)?;

        let mut lines = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut out = io::stdout().lock();
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                out.write_all(&buf)?;
                lines.push(String::from_utf8_lossy(&buf).trim_end().to_string());
            }
            out.flush()?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(UpdaterError::PackageUpgrade {
                message: format!("{} {}", PACKAGE_MANAGER, describe_status(&status)),
                code: status.code(),
            });
        }

        Ok(lines)
    }
}
