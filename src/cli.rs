// src/cli.rs

//! CLI definitions for the recipe runner

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mongoc-recipe")]
#[command(author, version, about = "Build-and-package recipe runner for the MongoDB C driver", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, build, and package the driver
    Build(BuildArgs),

    /// Download and verify the source archive without building
    Fetch(FetchArgs),

    /// Print resolved requirements and package metadata for a target
    Info(InfoArgs),
}

/// Recipe options shared by subcommands
#[derive(Args, Debug, Clone)]
pub struct OptionArgs {
    /// Build shared libraries instead of static archives
    #[arg(long)]
    pub shared: bool,

    /// Disable position-independent code (the option does not exist on
    /// Windows)
    #[arg(long)]
    pub no_fpic: bool,

    /// Enable ICU (Unicode) support
    #[arg(long)]
    pub icu: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub options: OptionArgs,

    /// Build type passed to CMake (debug or release)
    #[arg(long, default_value = "release")]
    pub build_type: String,

    /// Number of parallel compile jobs (default: all cores)
    #[arg(short, long)]
    pub jobs: Option<u32>,

    /// Package output directory
    #[arg(short, long, default_value = "package")]
    pub output: PathBuf,

    /// Directory for cached source archives
    #[arg(long)]
    pub source_cache: Option<PathBuf>,

    /// Keep the scratch build directory for debugging
    #[arg(long)]
    pub keep_builddir: bool,
}

#[derive(Args)]
pub struct FetchArgs {
    /// Directory for cached source archives
    #[arg(long)]
    pub source_cache: Option<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub options: OptionArgs,

    /// Target OS to resolve for (default: host)
    #[arg(long)]
    pub target_os: Option<String>,

    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from([
            "mongoc-recipe",
            "build",
            "--shared",
            "--icu",
            "--jobs",
            "2",
            "--output",
            "/tmp/pkg",
        ])
        .unwrap();

        match cli.command {
            Commands::Build(args) => {
                assert!(args.options.shared);
                assert!(args.options.icu);
                assert!(!args.options.no_fpic);
                assert_eq!(args.jobs, Some(2));
                assert_eq!(args.output, PathBuf::from("/tmp/pkg"));
            }
            _ => panic!("expected build subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_info() {
        let cli = Cli::try_parse_from([
            "mongoc-recipe",
            "info",
            "--target-os",
            "windows",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Info(args) => {
                assert_eq!(args.target_os.as_deref(), Some("windows"));
                assert!(args.json);
            }
            _ => panic!("expected info subcommand"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["mongoc-recipe"]).is_err());
    }
}
