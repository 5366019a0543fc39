// src/lib.rs

//! mongoc-recipe: build-and-package recipe runner for the MongoDB C driver
//!
//! Executes one recipe as a fixed, linear pipeline:
//! resolve options → resolve requirements → fetch source (by pinned
//! SHA-256) → configure and build with the driver's own CMake build
//! system → package licenses and artifacts → publish link-and-include
//! metadata for downstream build graphs.
//!
//! The driver itself is an opaque external dependency; nothing here
//! implements any database protocol, BSON, or TLS.

pub mod cli;
pub mod cmake;
pub mod cook;
mod error;
pub mod metadata;
pub mod options;
pub mod recipe;
pub mod requirements;
pub mod settings;
pub mod source;

pub use cmake::CMakeConfig;
pub use cook::{Cook, CookConfig, CookResult};
pub use error::{Error, Result};
pub use metadata::PackageInfo;
pub use options::RecipeOptions;
pub use recipe::Recipe;
pub use requirements::Requirement;
pub use settings::{Arch, BuildType, Os, Settings};
