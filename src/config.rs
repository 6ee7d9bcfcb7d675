use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Project directory the updater always works in. A leading `~` is expanded from `HOME`.
pub const PROJECT_DIR: &str = "~/pyProjects/sermonTranscriber";

/// Virtual environment directory, relative to the project directory.
pub const VENV_DIR: &str = "venvFiles";

/// Package upgraded through pip.
pub const PACKAGE_NAME: &str = "yt-dlp";

/// Executable whose version is reported after the upgrade.
pub const TOOL_EXECUTABLE: &str = "yt-dlp";

pub const VERSION_ARGS: &[&str] = &["--version"];

pub const CONFIRMATION_MESSAGE: &str = "yt-dlp update complete.";

/// Fixed parameters of an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    pub project_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub package: String,
    pub tool: String,
    pub version_args: Vec<String>,
    pub confirmation: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            project_dir: expand_home(PROJECT_DIR, std::env::var_os("HOME")),
            venv_dir: PathBuf::from(VENV_DIR),
            package: PACKAGE_NAME.to_string(),
            tool: TOOL_EXECUTABLE.to_string(),
            version_args: VERSION_ARGS.iter().map(|s| s.to_string()).collect(),
            confirmation: CONFIRMATION_MESSAGE.to_string(),
        }
    }
}

impl UpdaterConfig {
    /// Same package and tool, rooted at another project directory.
    #[cfg(test)]
    pub fn for_project<P: AsRef<Path>>(project_dir: P) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

/// Expands a leading `~` the way a shell `cd` would. Without a home directory the
/// path is left untouched and fails validation later.
fn expand_home(path: &str, home: Option<OsString>) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match home {
        Some(home) if !home.is_empty() => Path::new(&home).join(rest),
        _ => PathBuf::from(path),
    }
}
