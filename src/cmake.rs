// src/cmake.rs

//! CMake invocation for the wrapped build system
//!
//! The definition map deliberately switches off every optional dependency
//! the driver's build would otherwise auto-detect (SASL, Snappy, zstd,
//! DNS-SRV, shared-memory counters, ...) so the artifact's binary
//! interface is identical no matter what the host machine has installed.
//! Build failures surface the wrapped tool's stderr verbatim.

use crate::error::{Error, Result};
use crate::options::RecipeOptions;
use crate::settings::{Os, Settings};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Assembled CMake configuration for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeConfig {
    /// `-D` definitions, in a fixed order
    pub definitions: Vec<(String, String)>,
}

impl CMakeConfig {
    /// Assemble the definition map from settings and options
    pub fn prepare(settings: &Settings, options: &RecipeOptions) -> Self {
        let on_off = |v: bool| if v { "ON" } else { "OFF" };

        let mut definitions: Vec<(String, String)> = [
            ("ENABLE_TESTS", "OFF"),
            ("ENABLE_EXAMPLES", "OFF"),
            ("ENABLE_AUTOMATIC_INIT_AND_CLEANUP", "OFF"),
            ("ENABLE_BSON", "ON"),
            ("ENABLE_SASL", "OFF"),
            ("ENABLE_STATIC", on_off(!options.shared)),
            ("ENABLE_ICU", on_off(options.icu)),
            ("ENABLE_SHM_COUNTERS", "OFF"),
            ("ENABLE_SNAPPY", "OFF"),
            ("ENABLE_SRV", "OFF"),
            ("ENABLE_ZLIB", "BUNDLED"),
            ("ENABLE_ZSTD", "OFF"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        definitions.push((
            "CMAKE_BUILD_TYPE".to_string(),
            settings.build_type.cmake_value().to_string(),
        ));

        if let Some(fpic) = options.fpic {
            definitions.push((
                "CMAKE_POSITION_INDEPENDENT_CODE".to_string(),
                on_off(fpic).to_string(),
            ));
        }

        // The driver dlopens its ICU data on Linux
        if settings.os == Os::Linux {
            definitions.push(("CMAKE_SHARED_LINKER_FLAGS".to_string(), "-ldl".to_string()));
            definitions.push(("CMAKE_EXE_LINKER_FLAGS".to_string(), "-ldl".to_string()));
        }

        Self { definitions }
    }

    /// Look up a definition by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.definitions
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Run the configure step
    pub fn configure(&self, source_dir: &Path, build_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(build_dir)?;

        let mut cmd = Command::new("cmake");
        cmd.arg("-S").arg(source_dir).arg("-B").arg(build_dir);
        for (key, value) in &self.definitions {
            cmd.arg(format!("-D{}={}", key, value));
        }

        run_step("configure", cmd)
    }

    /// Run the compile step
    pub fn build(&self, build_dir: &Path, jobs: u32) -> Result<()> {
        let mut cmd = Command::new("cmake");
        cmd.arg("--build")
            .arg(build_dir)
            .arg("--parallel")
            .arg(jobs.to_string());

        run_step("build", cmd)
    }

    /// Run the install step into the given prefix
    pub fn install(&self, build_dir: &Path, prefix: &Path) -> Result<()> {
        std::fs::create_dir_all(prefix)?;

        let mut cmd = Command::new("cmake");
        cmd.arg("--install").arg(build_dir).arg("--prefix").arg(prefix);

        run_step("install", cmd)
    }
}

/// Run one build phase, failing with the tool's stderr on non-zero exit
fn run_step(phase: &'static str, mut cmd: Command) -> Result<()> {
    info!("Running {} phase", phase);
    debug!("Command: {:?}", cmd);

    let output = cmd.output().map_err(|e| Error::Build {
        phase,
        detail: format!("failed to spawn cmake: {}", e),
    })?;

    if !output.status.success() {
        return Err(Error::Build {
            phase,
            detail: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(())
}
