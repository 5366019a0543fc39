// src/main.rs

use anyhow::Result;
use clap::Parser;
use mongoc_recipe::cli::{BuildArgs, Cli, Commands, FetchArgs, InfoArgs, OptionArgs};
use mongoc_recipe::cook::{Cook, CookConfig};
use mongoc_recipe::metadata::PackageInfo;
use mongoc_recipe::options::RecipeOptions;
use mongoc_recipe::recipe::Recipe;
use mongoc_recipe::settings::{Os, Settings};
use mongoc_recipe::{requirements, source};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Fetch(args) => run_fetch(args),
        Commands::Info(args) => run_info(args),
    }
}

/// Convert CLI flags into the recipe option set
fn to_options(args: &OptionArgs) -> RecipeOptions {
    RecipeOptions {
        shared: args.shared,
        fpic: Some(!args.no_fpic),
        icu: args.icu,
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    let recipe = Recipe::builtin()?;

    let mut settings = Settings::detect()?;
    settings.build_type = args.build_type.parse()?;

    let mut config = CookConfig::default();
    if let Some(cache) = args.source_cache {
        config.source_cache = cache;
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    config.keep_builddir = args.keep_builddir;

    let cook = Cook::new(&config, &recipe, settings, to_options(&args.options))?;
    let result = cook.run(&args.output)?;

    println!(
        "Packaged {} {} into {} ({} files)",
        recipe.package.name,
        recipe.package.version,
        result.package_dir.display(),
        result.file_count
    );
    println!("  Libs: {}", result.package_info.libs.join(", "));
    for req in &result.requirements {
        println!("  Requires: {}", req);
    }

    Ok(())
}

fn run_fetch(args: FetchArgs) -> Result<()> {
    let recipe = Recipe::builtin()?;

    let config = CookConfig::default();
    let cache = args.source_cache.unwrap_or(config.source_cache);

    info!("Fetching {} {}", recipe.package.name, recipe.package.version);
    let path = source::fetch_source(&recipe, &cache)?;

    println!("Fetched and verified: {}", path.display());
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let recipe = Recipe::builtin()?;

    let os = match &args.target_os {
        Some(name) => name.parse::<Os>()?,
        None => Os::host()?,
    };

    let mut options = to_options(&args.options);
    options.prune_for(os);

    let reqs = requirements::resolve(os, &options);
    let package_info = PackageInfo::resolve(os, &options);

    if args.json {
        let doc = serde_json::json!({
            "package": {
                "name": recipe.package.name,
                "version": recipe.package.version,
            },
            "os": os,
            "options": options,
            "requirements": reqs,
            "package_info": package_info,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} {} ({})", recipe.package.name, recipe.package.version, os);
    println!("  Source: {}", recipe.archive_url());
    println!("  Checksum: {}", recipe.source.checksum);
    for req in &reqs {
        println!("  Requires: {}", req);
    }
    println!("  Libs: {}", package_info.libs.join(", "));
    println!("  Include dirs: {}", package_info.includedirs.join(", "));
    if !package_info.defines.is_empty() {
        println!("  Defines: {}", package_info.defines.join(", "));
    }
    if !package_info.system_libs.is_empty() {
        println!("  System libs: {}", package_info.system_libs.join(", "));
    }
    if !package_info.frameworks.is_empty() {
        println!("  Frameworks: {}", package_info.frameworks.join(", "));
    }

    Ok(())
}
