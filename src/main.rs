//! folio - Entry Point

use clap::{Parser, Subcommand};
use folio::config::{resolve_config, CliOverrides, ResolvedConfig};
use folio::manifest::{generate_manifest, load_manifest, IconManifest, IconResolver};
use folio::model::{AppError, Cadence};
use folio::view::PreviewOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

/// folio - icon manifest builder and motion preview for a personal site
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Icon manifest builder and motion preview for a personal site")]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress to stderr (batch commands)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scan the icon directory and write the manifest
    Manifest {
        /// Icon source directory
        #[arg(long)]
        icons_dir: Option<PathBuf>,

        /// Manifest output file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the asset path of each icon name
    Resolve {
        /// Icon names
        #[arg(required = true)]
        names: Vec<String>,

        /// Manifest to resolve against
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// URL root of the icon assets
        #[arg(long)]
        root: Option<String>,

        /// Treat a missing manifest as empty
        #[arg(long)]
        allow_missing: bool,
    },

    /// Run the interactive terminal preview
    Preview {
        /// Headline to type out (repeatable)
        #[arg(long = "text")]
        texts: Vec<String>,

        /// Per-character delay in milliseconds (must be positive)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        cadence: Option<u64>,
    },
}

impl Command {
    fn overrides(&self) -> Result<CliOverrides, AppError> {
        let overrides = match self {
            Command::Manifest { icons_dir, out } => CliOverrides {
                icons_dir: icons_dir.clone(),
                manifest_path: out.clone(),
                ..CliOverrides::default()
            },
            Command::Resolve { manifest, root, .. } => CliOverrides {
                manifest_path: manifest.clone(),
                icons_root: root.clone(),
                ..CliOverrides::default()
            },
            Command::Preview { cadence, .. } => CliOverrides {
                cadence: cadence.map(Cadence::from_millis).transpose()?,
                ..CliOverrides::default()
            },
        };
        Ok(overrides)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = resolve_config(cli.config.clone(), cli.command.overrides()?)?;

    match cli.command {
        Command::Manifest { .. } => {
            folio::logging::init_stderr(cli.verbose)?;
            info!(config = ?config, "Configuration loaded and resolved");
            run_manifest(&config)
        }
        Command::Resolve {
            names,
            allow_missing,
            ..
        } => {
            folio::logging::init_stderr(cli.verbose)?;
            info!(config = ?config, "Configuration loaded and resolved");
            for path in run_resolve(&config, &names, allow_missing)? {
                println!("{path}");
            }
            Ok(())
        }
        Command::Preview { texts, .. } => {
            folio::logging::init(&config.log_file_path)?;
            info!(config = ?config, "Configuration loaded and resolved");
            let options = PreviewOptions {
                texts,
                cadence: config.cadence,
                scroll_idle: config.scroll_idle,
                colors: config.colors,
            };
            folio::view::run(options)?;
            Ok(())
        }
    }
}

fn run_manifest(config: &ResolvedConfig) -> Result<(), AppError> {
    let manifest = generate_manifest(&config.icons_dir, &config.manifest_path)?;
    println!(
        "wrote {} icons to {}",
        manifest.len(),
        config.manifest_path.display()
    );
    Ok(())
}

fn run_resolve(
    config: &ResolvedConfig,
    names: &[String],
    allow_missing: bool,
) -> Result<Vec<String>, AppError> {
    let manifest = read_manifest(&config.manifest_path, allow_missing)?;
    let resolver = IconResolver::with_root(&config.icons_root, manifest);
    Ok(names.iter().map(|name| resolver.path(name)).collect())
}

fn read_manifest(path: &Path, allow_missing: bool) -> Result<IconManifest, AppError> {
    if allow_missing && !path.exists() {
        warn!(path = %path.display(), "manifest missing, every icon falls back to png");
        return Ok(IconManifest::new());
    }
    Ok(load_manifest(path)?)
}
