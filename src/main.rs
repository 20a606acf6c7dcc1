//! eas-config CLI
//!
//! Entry point for the `eas-config` command-line tool: validates an
//! eas.json document, resolves build/submit profiles, and lists
//! deprecation warnings.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use eas_config::deprecation::collect_deprecation_warnings;
use eas_config::resolve::{resolve_build_profile, resolve_submit_profile};
use eas_config::{EasJsonAccessor, Platform};

#[derive(Parser)]
#[command(name = "eas-config")]
#[command(about = "Resolve and validate eas.json profiles", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileKind {
    Build,
    Submit,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the eas.json document and list its profiles
    Validate {
        /// Project directory containing eas.json (default: current directory)
        #[arg(long, short = 'p', default_value = ".")]
        project_dir: PathBuf,
    },

    /// Resolve one profile to its fully-typed form
    Resolve {
        /// Target platform
        #[arg(long)]
        platform: Platform,

        /// Profile name (default: "production")
        #[arg(long)]
        profile: Option<String>,

        /// Profile kind to resolve
        #[arg(long, value_enum, default_value = "build")]
        kind: ProfileKind,

        /// Project directory containing eas.json (default: current directory)
        #[arg(long, short = 'p', default_value = ".")]
        project_dir: PathBuf,
    },

    /// List deprecation warnings for a build profile chain
    Deprecations {
        /// Target platform
        #[arg(long)]
        platform: Platform,

        /// Profile name (default: "production")
        #[arg(long)]
        profile: Option<String>,

        /// Project directory containing eas.json (default: current directory)
        #[arg(long, short = 'p', default_value = ".")]
        project_dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_dir } => run_validate(project_dir),
        Commands::Resolve {
            platform,
            profile,
            kind,
            project_dir,
        } => run_resolve(platform, profile.as_deref(), kind, project_dir),
        Commands::Deprecations {
            platform,
            profile,
            project_dir,
        } => run_deprecations(platform, profile.as_deref(), project_dir),
    }
}

fn run_validate(project_dir: PathBuf) {
    let mut accessor = EasJsonAccessor::from_project_dir(&project_dir);
    let document = match accessor.read() {
        Ok(document) => document.clone(),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    // Resolving every profile for every platform surfaces errors schema
    // validation alone cannot see (broken extends links, merged conflicts).
    for name in document.build.keys() {
        for platform in Platform::all() {
            if let Err(e) = resolve_build_profile(&document, platform, Some(name.as_str())) {
                eprintln!("Configuration error: {}", e);
                process::exit(1);
            }
        }
    }
    for name in document.submit.keys() {
        for platform in Platform::all() {
            if let Err(e) = resolve_submit_profile(&document, platform, Some(name.as_str())) {
                eprintln!("Configuration error: {}", e);
                process::exit(1);
            }
        }
    }

    println!(
        "Configuration valid: {}",
        project_dir.join(eas_config::EAS_JSON_FILE_NAME).display()
    );
    if let Some(digest) = accessor.fingerprint() {
        println!("  SHA-256: {}", digest);
    }
    println!("  Build profiles: {}", names(&document.build));
    println!("  Submit profiles: {}", names(&document.submit));
}

fn names(section: &serde_json::Map<String, serde_json::Value>) -> String {
    if section.is_empty() {
        "(none)".to_string()
    } else {
        section.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn run_resolve(
    platform: Platform,
    profile: Option<&str>,
    kind: ProfileKind,
    project_dir: PathBuf,
) {
    let mut accessor = EasJsonAccessor::from_project_dir(&project_dir);
    let document = match accessor.read() {
        Ok(document) => document.clone(),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let output = match kind {
        ProfileKind::Build => resolve_build_profile(&document, platform, profile)
            .map(|p| serde_json::to_string_pretty(&p)),
        ProfileKind::Submit => resolve_submit_profile(&document, platform, profile)
            .map(|p| serde_json::to_string_pretty(&p)),
    };
    match output {
        Ok(Ok(json)) => println!("{}", json),
        Ok(Err(e)) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_deprecations(platform: Platform, profile: Option<&str>, project_dir: PathBuf) {
    let mut accessor = EasJsonAccessor::from_project_dir(&project_dir);
    match collect_deprecation_warnings(&mut accessor, platform, profile) {
        Ok(warnings) if warnings.is_empty() => println!("No deprecated fields in use."),
        Ok(warnings) => {
            for warning in warnings {
                match warning.docs_url {
                    Some(url) => println!("warning: {} (see {})", warning.message, url),
                    None => println!("warning: {}", warning.message),
                }
            }
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}
