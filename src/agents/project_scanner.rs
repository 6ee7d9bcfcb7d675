use crate::error::Result;
use crate::utils::PathValidator;
use std::path::{Path, PathBuf};

/// ProjectScannerAgent resolves the directory every later step runs in
pub struct ProjectScannerAgent {
    project_path: PathBuf,
    venv_dir: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>, V: AsRef<Path>>(project_path: P, venv_dir: V) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
            venv_dir: venv_dir.as_ref().to_path_buf(),
        }
    }

    /// Validates the project directory. The environment inside it is checked on activation.
    pub fn validate(&self) -> Result<ProjectInfo> {
        let project_path = PathValidator::validate_project_path(&self.project_path)?;
        tracing::debug!(path = %project_path.display(), "project directory resolved");

        Ok(ProjectInfo {
            venv_path: project_path.join(&self.venv_dir),
            project_path,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub project_path: PathBuf,
    pub venv_path: PathBuf,
}
