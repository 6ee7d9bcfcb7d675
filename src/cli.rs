use clap::Parser;

/// The updater takes no operational arguments; the target project, environment,
/// and package are fixed.
#[derive(Parser, Debug)]
#[command(
    name = "ytup",
    about = "Upgrade yt-dlp inside the project's virtual environment and print its version",
    version
)]
pub struct Cli {
    /// Enable verbose diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
