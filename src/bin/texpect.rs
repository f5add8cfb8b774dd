use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use texpect::artifacts::ArtifactCatalog;
use texpect::ApprovalConfig;

#[derive(Parser, Debug)]
#[command(
    name = "texpect",
    about = "Review and promote received golden-master artifacts"
)]
struct Cli {
    /// JSON config overriding artifact extensions (defaults to the nearest
    /// texpect.json above DIR)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List received artifacts awaiting review
    Pending {
        /// Directory to search recursively
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Replace reference files with their received artifacts
    Promote {
        /// Directory to search recursively
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Only print what would be promoted
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

/// Diagnostics go to stderr; stdout carries only the command's report.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_file = cli.config;
    let catalog = |dir: PathBuf| {
        let config = match &config_file {
            Some(path) => ApprovalConfig::load_from_file(path),
            None => ApprovalConfig::discover(&dir),
        };
        tracing::debug!(root = %dir.display(), received = %config.received_extension, "scanning");
        ArtifactCatalog::new(dir, config)
    };

    match cli.command {
        Commands::Pending { dir } => run_pending(&catalog(dir)),
        Commands::Promote { dir, dry_run } => run_promote(&catalog(dir), dry_run),
    }
}

fn run_pending(catalog: &ArtifactCatalog) -> Result<ExitCode> {
    let pending = catalog.discover()?;
    if pending.is_empty() {
        println!("No received artifacts under {}", catalog.root().display());
        return Ok(ExitCode::from(0));
    }

    for artifact in &pending {
        let status = if artifact.replaces_existing() {
            "changed"
        } else {
            "new"
        };
        println!("{:>7} {}", status, artifact.received.display());
    }
    // Exit 2 while artifacts await review.
    Ok(ExitCode::from(2))
}

fn run_promote(catalog: &ArtifactCatalog, dry_run: bool) -> Result<ExitCode> {
    let pending = catalog.discover()?;
    for artifact in &pending {
        if dry_run {
            println!(
                "would promote {} -> {}",
                artifact.received.display(),
                artifact.approved.display()
            );
        } else {
            artifact.promote()?;
            println!("promoted {}", artifact.approved.display());
        }
    }
    Ok(ExitCode::from(0))
}
