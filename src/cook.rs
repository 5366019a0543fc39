// src/cook.rs

//! The recipe pipeline: prep, unpack, simmer, plate
//!
//! Stages run in a fixed order, once each, with no retry. Any stage
//! failure aborts the whole invocation and the error passes through
//! untranslated.

use crate::cmake::CMakeConfig;
use crate::error::{Error, Result};
use crate::metadata::PackageInfo;
use crate::options::RecipeOptions;
use crate::recipe::Recipe;
use crate::requirements::{self, Requirement};
use crate::settings::Settings;
use crate::source;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

/// CMake find-modules shipped with the package for consumers that locate
/// the libraries by module rather than by the driver's config files
const HELPER_FILES: &[(&str, &str)] = &[
    ("FindBSON.cmake", include_str!("../cmake/FindBSON.cmake")),
    ("FindMongoC.cmake", include_str!("../cmake/FindMongoC.cmake")),
];

/// Configuration for the cook pipeline
#[derive(Debug, Clone)]
pub struct CookConfig {
    /// Directory for downloaded, verified source archives
    pub source_cache: PathBuf,
    /// Number of parallel compile jobs
    pub jobs: u32,
    /// Keep the scratch build directory after completion (for debugging)
    pub keep_builddir: bool,
}

impl Default for CookConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        let source_cache = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("mongoc-recipe")
            .join("sources");

        Self {
            source_cache,
            jobs,
            keep_builddir: false,
        }
    }
}

/// Result of one cook invocation
#[derive(Debug)]
pub struct CookResult {
    /// The populated package prefix
    pub package_dir: PathBuf,
    /// Published link-and-include metadata
    pub package_info: PackageInfo,
    /// Requirements resolved for this build
    pub requirements: Vec<Requirement>,
    /// Number of files in the package tree
    pub file_count: usize,
    /// Stage log
    pub log: String,
}

/// A single cook operation
pub struct Cook<'a> {
    config: &'a CookConfig,
    recipe: &'a Recipe,
    settings: Settings,
    options: RecipeOptions,
    /// Scratch directory holding the extracted source and the CMake
    /// build tree
    build_dir: TempDir,
    source_dir: Option<PathBuf>,
    log: String,
}

impl<'a> Cook<'a> {
    /// Set up a cook, finalizing settings and options for the target.
    ///
    /// The wrapped library is pure C, so C++ settings are stripped, and
    /// platform-inapplicable options are pruned before anything runs.
    pub fn new(
        config: &'a CookConfig,
        recipe: &'a Recipe,
        mut settings: Settings,
        mut options: RecipeOptions,
    ) -> Result<Self> {
        settings.strip_cxx();
        options.prune_for(settings.os);

        let build_dir = TempDir::new()?;

        Ok(Self {
            config,
            recipe,
            settings,
            options,
            build_dir,
            source_dir: None,
            log: String::new(),
        })
    }

    /// Run the full pipeline, populating `output_dir` as the package
    /// prefix.
    pub fn run(mut self, output_dir: &Path) -> Result<CookResult> {
        info!(
            "Cooking {} {} for {} ({})",
            self.recipe.package.name,
            self.recipe.package.version,
            self.settings.os,
            if self.options.shared { "shared" } else { "static" },
        );

        let requirements = requirements::resolve(self.settings.os, &self.options);
        for req in &requirements {
            debug!("Requires {}", req);
        }

        let archive = self.prep()?;
        self.unpack(&archive)?;
        self.simmer()?;
        let file_count = self.plate(output_dir)?;

        let package_info = PackageInfo::resolve(self.settings.os, &self.options);

        if self.config.keep_builddir {
            let kept = self.build_dir.into_path();
            info!("Keeping build directory: {}", kept.display());
        }

        Ok(CookResult {
            package_dir: output_dir.to_path_buf(),
            package_info,
            requirements,
            file_count,
            log: self.log,
        })
    }

    /// Prep: fetch and verify the source archive
    fn prep(&mut self) -> Result<PathBuf> {
        info!("Prep: fetching source...");
        let archive = source::fetch_source(self.recipe, &self.config.source_cache)?;
        self.log_line(&format!("Fetched source: {}", self.recipe.archive_url()));
        Ok(archive)
    }

    /// Unpack: extract into the scratch dir under the canonical name
    fn unpack(&mut self, archive: &Path) -> Result<()> {
        info!("Unpacking source...");
        let source_dir = source::unpack(self.recipe, archive, self.build_dir.path())?;
        self.log_line(&format!("Extracted to {}", source_dir.display()));
        self.source_dir = Some(source_dir);
        Ok(())
    }

    /// Simmer: configure and compile with the wrapped build system
    fn simmer(&mut self) -> Result<()> {
        info!("Simmering: configuring and building...");
        let source_dir = self.source_dir()?.to_path_buf();
        let cmake_build_dir = self.build_dir.path().join("build");

        let cmake = CMakeConfig::prepare(&self.settings, &self.options);
        cmake.configure(&source_dir, &cmake_build_dir)?;
        self.log_line("Configured");

        cmake.build(&cmake_build_dir, self.config.jobs)?;
        self.log_line(&format!("Built with {} jobs", self.config.jobs));

        Ok(())
    }

    /// Plate: copy license files, then install into the package prefix
    fn plate(&mut self, output_dir: &Path) -> Result<usize> {
        info!("Plating: packaging into {}", output_dir.display());

        let licenses = self.copy_licenses(output_dir)?;
        self.log_line(&format!("Copied {} license file(s)", licenses));

        write_helpers(output_dir)?;
        self.log_line(&format!("Wrote {} build-helper file(s)", HELPER_FILES.len()));

        let cmake_build_dir = self.build_dir.path().join("build");
        let cmake = CMakeConfig::prepare(&self.settings, &self.options);
        cmake.install(&cmake_build_dir, output_dir)?;

        let file_count = WalkDir::new(output_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count();

        // Anything beyond the licenses and helpers must have come from
        // the install step
        if file_count <= licenses + HELPER_FILES.len() {
            return Err(Error::Build {
                phase: "install",
                detail: "no files installed to the package prefix".to_string(),
            });
        }

        self.log_line(&format!("Packaged {} file(s)", file_count));
        info!("Cooked: {} ({} files)", output_dir.display(), file_count);

        Ok(file_count)
    }

    /// Copy license files matching the recipe's patterns from the source
    /// tree root into `<output>/licenses/`
    fn copy_licenses(&self, output_dir: &Path) -> Result<usize> {
        let source_dir = self.source_dir()?;
        let license_dir = output_dir.join("licenses");
        fs::create_dir_all(&license_dir)?;

        let mut copied = 0;
        for entry in fs::read_dir(source_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if self
                .recipe
                .licenses
                .patterns
                .iter()
                .any(|p| matches_pattern(&name, p))
            {
                fs::copy(entry.path(), license_dir.join(name.as_ref()))?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    fn source_dir(&self) -> Result<&Path> {
        self.source_dir
            .as_deref()
            .ok_or_else(|| Error::NotFound(self.build_dir.path().join(source::SOURCE_DIR)))
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }
}

/// Write the bundled CMake find-modules into the package root
fn write_helpers(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)?;
    for (name, content) in HELPER_FILES {
        fs::write(output_dir.join(name), content)?;
    }
    Ok(())
}

/// Match a filename against a pattern with an optional trailing `*`
fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == pattern,
    }
}
