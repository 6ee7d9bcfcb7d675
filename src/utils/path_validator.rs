use crate::error::{Result, UpdaterError};
use std::path::{Path, PathBuf};

/// Path checks shared by the project and environment steps.
pub struct PathValidator;

impl PathValidator {
    /// Validates and canonicalises the project directory.
    pub fn validate_project_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            UpdaterError::ProjectValidation(format!("Invalid path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(UpdaterError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        Ok(canonical)
    }

    /// Ensures the file exists, is a regular file, and resides inside the base directory.
    pub fn validate_file_path(
        file_path: impl AsRef<Path>,
        base_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let file_path = file_path.as_ref();
        let base_dir = base_dir.as_ref();

        let canonical_file = file_path.canonicalize().map_err(|e| {
            UpdaterError::EnvironmentActivation(format!(
                "Invalid file path '{}': {e}",
                file_path.display()
            ))
        })?;

        let canonical_base = base_dir.canonicalize().map_err(|e| {
            UpdaterError::EnvironmentActivation(format!(
                "Invalid base directory '{}': {e}",
                base_dir.display()
            ))
        })?;

        if !canonical_file.starts_with(&canonical_base) {
            return Err(UpdaterError::EnvironmentActivation(format!(
                "'{}' is outside '{}'",
                canonical_file.display(),
                canonical_base.display()
            )));
        }

        if !canonical_file.is_file() {
            return Err(UpdaterError::EnvironmentActivation(format!(
                "'{}' is not a file",
                canonical_file.display()
            )));
        }

        Ok(canonical_file)
    }
}
