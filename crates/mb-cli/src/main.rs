//! `moodboard`: create, inspect and repair moodboard project files.
//!
//! Log output goes to stderr and follows `RUST_LOG` (default `warn`).

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mb_core::config::CanvasSettings;
use mb_core::error::{CanvasError, Result};
use mb_core::persist;
use mb_core::project::Project;

#[derive(Parser)]
#[command(name = "moodboard")]
#[command(about = "Create, inspect and repair moodboard project files")]
struct Cli {
    /// JSON file overriding canvas settings
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an empty project with a single tab
    New {
        path: PathBuf,
        /// Project name (default: file stem)
        #[arg(short, long)]
        name: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print tabs, item counts and nodes, plus anything repaired on load
    Inspect { path: PathBuf },

    /// Load with recovery and report what had to be dropped
    Check {
        path: PathBuf,
        /// Save the repaired project back to `path`
        #[arg(long)]
        fix: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = load_settings(cli.settings.as_deref()).and_then(|settings| match cli.command {
        Commands::New { path, name, force } => new_project(&path, name, force, &settings),
        Commands::Inspect { path } => inspect(&path),
        Commands::Check { path, fix } => check(&path, fix),
    });

    match result {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            eprintln!("moodboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<CanvasSettings> {
    let Some(path) = path else {
        return Ok(CanvasSettings::default());
    };
    let json = std::fs::read_to_string(path).map_err(|e| CanvasError::io(path, e))?;
    let settings = CanvasSettings::from_json_str(&json)?;
    log::debug!("canvas settings from {path:?}");
    Ok(settings)
}

fn new_project(
    path: &Path,
    name: Option<String>,
    force: bool,
    settings: &CanvasSettings,
) -> Result<ExitCode> {
    if path.exists() && !force {
        return Err(CanvasError::Validation(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Project".into())
    });
    let project = Project::new(name, settings);
    persist::save(&project, path)?;
    println!("created {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn inspect(path: &Path) -> Result<ExitCode> {
    let (project, load_report) = persist::load_with_report(path)?;
    print!("{}", report::describe_project(&project));
    let repairs = report::describe_repairs(&load_report);
    if !repairs.is_empty() {
        println!("repaired on load:");
        print!("{repairs}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Exit status is non-zero when problems were found and left in place.
fn check(path: &Path, fix: bool) -> Result<ExitCode> {
    let (project, load_report) = persist::load_with_report(path)?;
    if load_report.is_clean() {
        println!("{}: ok", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    print!("{}", report::describe_repairs(&load_report));
    if fix {
        persist::save(&project, path)?;
        println!("{}: repaired", path.display());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}: problems found (run with --fix to save the repaired project)", path.display());
        Ok(ExitCode::FAILURE)
    }
}
