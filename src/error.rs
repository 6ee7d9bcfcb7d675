use thiserror::Error;

/// Exit code a shell reports when a command cannot be found or executed.
pub const EXIT_SPAWN_FAILED: i32 = 127;

#[derive(Error, Debug)]
pub enum UpdaterError {
    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("Environment activation failed: {0}")]
    EnvironmentActivation(String),

    #[error("Package upgrade failed: {message}")]
    PackageUpgrade { message: String, code: Option<i32> },

    #[error("Version report failed: {message}")]
    VersionReport { message: String, code: Option<i32> },

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpdaterError {
    /// Process exit code for this failure, propagated from the failing child when it has one.
    pub fn exit_code(&self) -> i32 {
        match self {
            UpdaterError::PackageUpgrade { code, .. } | UpdaterError::VersionReport { code, .. } => {
                match code {
                    Some(code) if *code != 0 => *code,
                    _ => 1,
                }
            }
            UpdaterError::Spawn { .. } => EXIT_SPAWN_FAILED,
            UpdaterError::ProjectValidation(_)
            | UpdaterError::EnvironmentActivation(_)
            | UpdaterError::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdaterError>;
