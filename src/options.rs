// src/options.rs

//! Recipe option set
//!
//! Three flags control the build: `shared` (linkage mode), `fpic`
//! (position-independent code, absent on Windows where it has no
//! meaning), and `icu` (Unicode support in the driver).

use crate::settings::Os;
use serde::{Deserialize, Serialize};

/// Options for one recipe invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeOptions {
    /// Build shared libraries instead of static archives
    pub shared: bool,
    /// Compile with -fPIC; `None` means the option was pruned for the
    /// target platform
    pub fpic: Option<bool>,
    /// Enable ICU (Unicode) support
    pub icu: bool,
}

impl Default for RecipeOptions {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: Some(true),
            icu: false,
        }
    }
}

impl RecipeOptions {
    /// Remove options that do not apply to the target platform.
    ///
    /// `fPIC` is meaningless on Windows, so the option is dropped there
    /// entirely rather than defaulted.
    pub fn prune_for(&mut self, os: Os) {
        if os == Os::Windows {
            self.fpic = None;
        }
    }

    /// Whether position-independent code is requested (false when the
    /// option is absent)
    pub fn wants_fpic(&self) -> bool {
        self.fpic.unwrap_or(false)
    }
}
