use crate::agents::{
    PackageManagerAgent, ProjectScannerAgent, ToolVersionAgent, UpgradeOutcome, VirtualEnvAgent,
};
use crate::config::UpdaterConfig;
use crate::error::Result;
use colored::Colorize;
use jiff::Zoned;
use std::path::PathBuf;

/// Summary of a completed update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub package: String,
    pub venv_path: PathBuf,
    pub outcome: UpgradeOutcome,
    pub tool_version: String,
    pub python_version: Option<String>,
}

/// Execute the update workflow.
///
/// Steps run strictly in order and the first failure aborts the run; the confirmation
/// message is printed only after every step has succeeded.
pub fn execute_update(config: &UpdaterConfig) -> Result<UpdateReport> {
    let started = Zoned::now();
    println!(
        "{} {}",
        format!("Updating {}...", config.package).cyan().bold(),
        started.strftime("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );

    // Step 1: Enter project directory
    println!("\n{}", "1. Entering project directory...".yellow());
    let scanner = ProjectScannerAgent::new(&config.project_dir, &config.venv_dir);
    let project = scanner.validate()?;
    println!("{}", format!("✓ {}", project.project_path.display()).green());

    // Step 2: Activate virtual environment
    println!("\n{}", "2. Activating virtual environment...".yellow());
    let env = VirtualEnvAgent::new(&project).activate()?;
    println!("{}", format!("✓ {} activated", env.root().display()).green());

    // Step 3: Upgrade package
    println!("\n{}", format!("3. Upgrading {}...", config.package).yellow());
    let outcome = PackageManagerAgent::new(&env).upgrade(&config.package)?;
    println!("{}", format!("✓ {}", outcome).green());

    // Step 4: Report installed version
    println!("\n{}", "4. Installed version:".yellow());
    let tool_version =
        ToolVersionAgent::new(&env).report(&config.tool, config.version_args.as_slice())?;

    // Step 5: Deactivate
    println!("\n{}", "5. Deactivating virtual environment...".yellow());
    let venv_path = env.root().to_path_buf();
    let python_version = env.python_version().map(str::to_string);
    env.deactivate();
    println!("{}", "✓ Environment deactivated".green());

    let report = UpdateReport {
        package: config.package.clone(),
        venv_path,
        outcome,
        tool_version,
        python_version,
    };
    tracing::debug!(
        package = %report.package,
        version = %report.tool_version,
        outcome = %report.outcome,
        "update finished"
    );

    print_update_report(&report);

    // Step 6: Confirm
    println!("\n{}", config.confirmation.green().bold());
    Ok(report)
}

fn print_update_report(report: &UpdateReport) {
    println!("\n{}", "Summary:".cyan().bold());
    println!(
        "  • {} {}",
        report.package.white().bold(),
        report.tool_version.green().bold()
    );

    let status = match &report.outcome {
        UpgradeOutcome::Upgraded { .. } => report.outcome.to_string().green(),
        UpgradeOutcome::AlreadyLatest { .. } => report.outcome.to_string().dimmed(),
        UpgradeOutcome::Unknown => report.outcome.to_string().yellow(),
    };
    println!("  • {}", status);

    match &report.python_version {
        Some(python) => println!(
            "  • {} (Python {})",
            report.venv_path.display().to_string().dimmed(),
            python
        ),
        None => println!("  • {}", report.venv_path.display().to_string().dimmed()),
    }
}
