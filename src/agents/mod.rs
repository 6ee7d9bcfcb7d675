pub mod package_manager;
pub mod process;
pub mod project_scanner;
pub mod tool_version;
pub mod virtual_env;

pub use package_manager::{PackageManagerAgent, UpgradeOutcome};
pub use project_scanner::ProjectScannerAgent;
pub use tool_version::ToolVersionAgent;
pub use virtual_env::VirtualEnvAgent;
