//! tabview CLI - sort and classify analysis result tables

#![deny(warnings)]

// Global invariants enforced:
// - Header toggles are applied in the order given
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabview_core::{config, profile, render_html, render_json, render_text};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabview")]
#[command(about = "Sort and classify tabular analysis results")]
#[command(version = env!("TABVIEW_VERSION"))]
struct Cli {
    /// Enable debug logging on stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a payload file as a sorted, classified table
    Render {
        /// Path to the JSON payload returned by an analysis backend
        payload: PathBuf,

        /// Dataset profile to apply
        #[arg(long)]
        profile: String,

        /// Header click on a column; repeat to toggle more than once
        #[arg(long = "sort")]
        sort: Vec<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file path (for HTML format, default: tabview-report.html)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect available dataset profiles
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,

        /// Path to config file (default: auto-discover)
        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProfilesAction {
    /// List profile names and titles
    List,
    /// Print one resolved profile as JSON
    Show {
        /// Profile name
        name: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without rendering anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            payload,
            profile,
            sort,
            format,
            config: config_path,
            output,
        } => {
            if !payload.exists() {
                anyhow::bail!("Payload does not exist: {}", payload.display());
            }

            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            let profile = resolved.require_profile(&profile)?;
            let (view, summary) = tabview_core::open_view(&payload, profile, &sort)?;
            tracing::debug!(
                profile = %profile.name,
                rows = view.len(),
                clicks = sort.len(),
                "rendering view"
            );

            match format {
                OutputFormat::Text => print!("{}", render_text(&view)),
                OutputFormat::Json => println!("{}", render_json(&view, summary.as_ref())),
                OutputFormat::Html => {
                    let html = render_html(&view, summary.as_ref());
                    let output_path =
                        output.unwrap_or_else(|| PathBuf::from("tabview-report.html"));
                    write_html_report(&output_path, &html)?;
                    eprintln!("HTML report written to: {}", output_path.display());
                }
            }
        }
        Commands::Profiles {
            action,
            config: config_path,
        } => {
            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            match action {
                ProfilesAction::List => {
                    for p in &resolved.profiles {
                        let origin = if profile::builtin(&p.name).as_ref() == Some(p) {
                            "built-in"
                        } else {
                            "config"
                        };
                        println!("{:<16} {:<10} {}", p.name, origin, p.title);
                    }
                }
                ProfilesAction::Show { name } => {
                    let p = resolved.require_profile(&name)?;
                    let json = serde_json::to_string_pretty(p)
                        .context("failed to serialize profile")?;
                    println!("{}", json);
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using built-in profiles.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
        },
    }

    Ok(())
}

/// Route tracing output to stderr; RUST_LOG applies unless --verbose is given
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Write HTML report to file with atomic write pattern
fn write_html_report(path: &Path, html: &str) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("html.tmp");
    fs::write(&temp_path, html)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}
