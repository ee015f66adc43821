use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Profile-driven build pipeline for game projects.
///
/// Resolves a build profile and its option flags into a build name, a version
/// bump, compile-time symbols and packaging decisions, then runs the
/// configured compile command between staged actions.
///
/// EXAMPLES:
///     shipwright init                        Write a starter shipwright.toml
///     shipwright preview -p dev              Show what a build would do
///     shipwright build -p release --zip      Build and always zip
///     shipwright build --flag demo-content   Enable a flag for one build
///     shipwright bump -p dev                 Bump the version only
///
/// ENVIRONMENT VARIABLES:
///     SHIPWRIGHT_JSON           Set to 'true' for JSON output by default
///     SHIPWRIGHT_OUTPUT_FOLDER  Override the output root folder name
///     RUST_LOG                  Log filter (default: info)
///     NO_COLOR                  Set to disable colored output
#[derive(Parser)]
#[command(name = "shipwright")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory (searched upwards for shipwright.toml)
    #[arg(long, short = 'C', global = true, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full build for a profile
    ///
    /// EXAMPLES:
    ///     shipwright build                          Build the last used profile
    ///     shipwright build -p release --zip         Force a zip
    ///     shipwright build --flag skip-zip=false    Override a flag
    #[command(visible_alias = "b")]
    Build {
        /// Profile id (defaults to the last used profile)
        #[arg(long, short = 'p')]
        profile: Option<String>,
        /// Flag override as `id`, `id=true` or `id=false` (repeatable)
        #[arg(long = "flag", short = 'f', value_name = "ID[=BOOL]")]
        flags: Vec<String>,
        /// Zip the build regardless of profile and flags
        #[arg(long)]
        zip: bool,
        /// JSON output
        #[arg(long, env = "SHIPWRIGHT_JSON")]
        json: bool,
    },

    /// Show the resolved build without side effects
    Preview {
        #[arg(long, short = 'p')]
        profile: Option<String>,
        #[arg(long = "flag", short = 'f', value_name = "ID[=BOOL]")]
        flags: Vec<String>,
        #[arg(long)]
        zip: bool,
        #[arg(long, env = "SHIPWRIGHT_JSON")]
        json: bool,
    },

    /// Bump the project version with the profile's mode
    Bump {
        #[arg(long, short = 'p')]
        profile: Option<String>,
    },

    /// Apply the profile's symbols to the project settings
    ApplySymbols {
        #[arg(long, short = 'p')]
        profile: Option<String>,
        #[arg(long = "flag", short = 'f', value_name = "ID[=BOOL]")]
        flags: Vec<String>,
    },

    /// Validate shipwright.toml
    Validate {
        #[arg(long, env = "SHIPWRIGHT_JSON")]
        json: bool,
    },

    /// List the configured profiles
    Profiles {
        #[arg(long, env = "SHIPWRIGHT_JSON")]
        json: bool,
    },

    /// Write a starter shipwright.toml
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Print the build output root folder
    OutputDir,

    /// Run the preprocess hook for a build started outside shipwright
    Preprocess {
        /// Platform the external build targets
        #[arg(long)]
        platform: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let cli_config = config::Config::from_env();
    cli_config.apply_color();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let dir = cli.project_dir;

    match cli.command {
        Commands::Build {
            profile,
            flags,
            zip,
            json,
        } => commands::build::run(commands::build::BuildArgs {
            project_dir: dir,
            profile,
            flags,
            zip,
            json,
        }),
        Commands::Preview {
            profile,
            flags,
            zip,
            json,
        } => {
            commands::preview::run(&dir, profile.as_deref(), &flags, zip, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Bump { profile } => {
            commands::bump::run(&dir, profile.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ApplySymbols { profile, flags } => {
            commands::symbols::run(&dir, profile.as_deref(), &flags)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { json } => commands::validate::run(&dir, json),
        Commands::Profiles { json } => {
            commands::profiles::run(&dir, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(&dir, force)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::OutputDir => {
            commands::output_dir::run(&dir)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Preprocess { platform } => {
            commands::preprocess::run(&dir, &platform)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
