use crate::agents::project_scanner::ProjectInfo;
use crate::error::{Result, UpdaterError};
use crate::utils::PathValidator;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(not(target_os = "windows"))]
const BIN_DIR: &str = "bin";
#[cfg(target_os = "windows")]
const BIN_DIR: &str = "Scripts";

#[cfg(not(target_os = "windows"))]
const ACTIVATE_SCRIPT: &str = "activate";
#[cfg(target_os = "windows")]
const ACTIVATE_SCRIPT: &str = "activate.bat";

/// Every venv activation script assigns this variable.
const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";

/// VirtualEnvAgent validates an environment and produces its activation context
pub struct VirtualEnvAgent {
    project_path: PathBuf,
    venv_path: PathBuf,
}

impl VirtualEnvAgent {
    pub fn new(project: &ProjectInfo) -> Self {
        Self {
            project_path: project.project_path.clone(),
            venv_path: project.venv_path.clone(),
        }
    }

    /// Activate the environment for child processes started through the returned context.
    ///
    /// Fails when the environment directory or its activation script is missing, or when
    /// the script is unreadable, empty, or does not set `VIRTUAL_ENV`.
    pub fn activate(&self) -> Result<ActiveEnvironment> {
        if !self.venv_path.is_dir() {
            return Err(UpdaterError::EnvironmentActivation(format!(
                "Virtual environment '{}' not found",
                self.venv_path.display()
            )));
        }

        let root = self.venv_path.canonicalize()?;
        let bin_dir = root.join(BIN_DIR);
        let script = PathValidator::validate_file_path(bin_dir.join(ACTIVATE_SCRIPT), &root)?;
        Self::check_activation_script(&script)?;

        let path = Self::prepend_to_path(&bin_dir, std::env::var_os("PATH"))?;
        let metadata = PyvenvConfig::load(&root);
        if let Some(cfg) = &metadata {
            tracing::debug!(
                home = cfg.home.as_deref().unwrap_or("-"),
                version = cfg.version.as_deref().unwrap_or("-"),
                system_site_packages = ?cfg.include_system_site_packages,
                "read pyvenv.cfg"
            );
        }

        tracing::debug!(venv = %root.display(), "environment activated");

        Ok(ActiveEnvironment {
            project_path: self.project_path.clone(),
            root,
            bin_dir,
            path,
            metadata,
            active: true,
        })
    }

    fn check_activation_script(script: &Path) -> Result<()> {
        let bytes = fs::read(script).map_err(|e| {
            UpdaterError::EnvironmentActivation(format!(
                "Cannot read activation script '{}': {e}",
                script.display()
            ))
        })?;

        let content = String::from_utf8(bytes).map_err(|_| {
            UpdaterError::EnvironmentActivation(format!(
                "Activation script '{}' is not valid UTF-8",
                script.display()
            ))
        })?;

        if content.trim().is_empty() {
            return Err(UpdaterError::EnvironmentActivation(format!(
                "Activation script '{}' is empty",
                script.display()
            )));
        }

        if !content.contains(VIRTUAL_ENV_VAR) {
            return Err(UpdaterError::EnvironmentActivation(format!(
                "Activation script '{}' does not set {VIRTUAL_ENV_VAR}",
                script.display()
            )));
        }

        Ok(())
    }

    fn prepend_to_path(bin_dir: &Path, current: Option<OsString>) -> Result<OsString> {
        let mut entries = vec![bin_dir.to_path_buf()];
        if let Some(current) = current {
            entries.extend(std::env::split_paths(&current));
        }

        std::env::join_paths(entries).map_err(|e| {
            UpdaterError::EnvironmentActivation(format!("Cannot build PATH: {e}"))
        })
    }
}

/// Activation context of a virtual environment.
///
/// Nothing process-wide is mutated: commands created through [`ActiveEnvironment::command`]
/// carry the environment overlay and run in the project directory. Because the overlay only
/// exists inside this value, releasing it is giving it up: [`ActiveEnvironment::deactivate`]
/// consumes `self`, so no further [`ActiveEnvironment::command`] can be built afterwards, and
/// on early exit the same happens when it is dropped.
#[derive(Debug)]
pub struct ActiveEnvironment {
    project_path: PathBuf,
    root: PathBuf,
    bin_dir: PathBuf,
    path: OsString,
    metadata: Option<PyvenvConfig>,
    active: bool,
}

impl ActiveEnvironment {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn python_version(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|cfg| cfg.version.as_deref())
    }

    /// Executable from the environment's bin dir when present, otherwise the bare name,
    /// looked up on the overlaid `PATH`.
    pub fn resolve_executable(&self, program: &str) -> PathBuf {
        let candidate = self
            .bin_dir
            .join(format!("{program}{}", std::env::consts::EXE_SUFFIX));
        if candidate.is_file() {
            candidate
        } else {
            PathBuf::from(program)
        }
    }

    /// Command for `program` with the activation overlay applied.
    pub fn command(&self, program: &str) -> Command {
        let mut command = Command::new(self.resolve_executable(program));
        command
            .current_dir(&self.project_path)
            .env(VIRTUAL_ENV_VAR, &self.root)
            .env("PATH", &self.path)
            .env_remove("PYTHONHOME");
        command
    }

    /// Ends the activation. Commands already spawned keep the overlay they started with.
    pub fn deactivate(mut self) {
        self.active = false;
        tracing::debug!(venv = %self.root.display(), "environment deactivated");
    }
}

impl Drop for ActiveEnvironment {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            tracing::debug!(venv = %self.root.display(), "environment released after failure");
        }
    }
}

/// Fields of interest from `pyvenv.cfg`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PyvenvConfig {
    pub home: Option<String>,
    pub version: Option<String>,
    pub include_system_site_packages: Option<bool>,
}

impl PyvenvConfig {
    /// Reads `<venv>/pyvenv.cfg`; a missing or unreadable file yields `None`.
    pub fn load(venv_root: &Path) -> Option<Self> {
        let path = venv_root.join("pyvenv.cfg");
        match fs::read_to_string(&path) {
            Ok(content) => Some(Self::parse(&content)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "pyvenv.cfg unavailable");
                None
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut cfg = Self::default();

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();

            match key.trim() {
                "home" => cfg.home = Some(value),
                "version" | "version_info" => {
                    if cfg.version.is_none() {
                        cfg.version = Some(value);
                    }
                }
                "include-system-site-packages" => {
                    cfg.include_system_site_packages = match value.to_lowercase().as_str() {
                        "true" => Some(true),
                        "false" => Some(false),
                        _ => None,
                    };
                }
                _ => {}
            }
        }

        cfg
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::agents::project_scanner::ProjectScannerAgent;
    use crate::test_support::{FakeProject, VENV_DIR};

    fn activate(project: &FakeProject) -> Result<ActiveEnvironment> {
        let info = ProjectScannerAgent::new(project.path(), VENV_DIR)
            .validate()
            .unwrap();
        VirtualEnvAgent::new(&info).activate()
    }

    #[test]
    fn activates_complete_environment() {
        let project = FakeProject::new();
        let env = activate(&project).unwrap();

        assert_eq!(env.root(), project.venv_path().canonicalize().unwrap());
        assert_eq!(env.python_version(), Some("3.12.3"));
        assert!(env.resolve_executable("pip").ends_with("bin/pip"));
        env.deactivate();
    }

    #[test]
    fn deactivate_leaves_spawned_children_untouched() {
        let project = FakeProject::new();
        let env = activate(&project).unwrap();

        let mut command = env.command("sh");
        command.args(["-c", "printf '%s' \"$VIRTUAL_ENV\""]);
        let root = env.root().to_path_buf();
        env.deactivate();

        let output = command.output().unwrap();
        assert_eq!(String::from_utf8(output.stdout).unwrap(), root.display().to_string());
        assert!(std::env::var_os("VIRTUAL_ENV").is_none_or(|v| v != root.as_os_str()));
    }

    #[test]
    fn missing_environment_directory_is_fatal() {
        let project = FakeProject::without_venv();
        let err = activate(&project).unwrap_err();
        assert!(matches!(err, UpdaterError::EnvironmentActivation(_)));
    }

    #[test]
    fn missing_activation_script_is_fatal() {
        let project = FakeProject::new();
        fs::remove_file(project.bin_dir().join("activate")).unwrap();
        let err = activate(&project).unwrap_err();
        assert!(matches!(err, UpdaterError::EnvironmentActivation(_)));
    }

    #[test]
    fn malformed_activation_script_is_fatal() {
        let project = FakeProject::new();
        let script = project.bin_dir().join("activate");

        fs::write(&script, "   \n").unwrap();
        assert!(activate(&project).is_err());

        fs::write(&script, "echo hello\n").unwrap();
        assert!(activate(&project).is_err());

        fs::write(&script, [0xff, 0xfe, 0x00]).unwrap();
        assert!(activate(&project).is_err());
    }

    #[test]
    fn command_carries_overlay() {
        let project = FakeProject::new();
        let env = activate(&project).unwrap();

        let output = env
            .command("sh")
            .args(["-c", "printf '%s|%s' \"$VIRTUAL_ENV\" \"${PATH%%:*}\""])
            .output()
            .unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        let root = project.venv_path().canonicalize().unwrap();

        assert_eq!(
            stdout,
            format!("{}|{}", root.display(), root.join("bin").display())
        );
    }

    #[test]
    fn commands_run_in_project_directory() {
        let project = FakeProject::new();
        let env = activate(&project).unwrap();

        let output = env.command("sh").args(["-c", "pwd"]).output().unwrap();
        let cwd = String::from_utf8(output.stdout).unwrap();
        assert_eq!(
            Path::new(cwd.trim()).canonicalize().unwrap(),
            project.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn parses_pyvenv_cfg() {
        let cfg = PyvenvConfig::parse(
            "home = /opt/python/bin\ninclude-system-site-packages = False\nversion_info = 3.11.9.final.0\nnot a pair\n",
        );
        assert_eq!(cfg.home.as_deref(), Some("/opt/python/bin"));
        assert_eq!(cfg.version.as_deref(), Some("3.11.9.final.0"));
        assert_eq!(cfg.include_system_site_packages, Some(false));
    }

    #[test]
    fn pyvenv_cfg_is_optional() {
        let project = FakeProject::new();
        fs::remove_file(project.venv_path().join("pyvenv.cfg")).unwrap();
        let env = activate(&project).unwrap();
        assert_eq!(env.python_version(), None);
    }
}
