// src/requirements.rs

//! Requirement resolution
//!
//! The dependency list is fixed, not solved: zlib always, OpenSSL on
//! platforms without a native TLS stack, ICU only when requested. The
//! resolution is purely additive and idempotent.

use crate::options::RecipeOptions;
use crate::settings::Os;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pinned package requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
}

impl Requirement {
    fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Resolve the requirement list for a target OS and option set.
///
/// macOS and Windows use their platform-native TLS stacks, so OpenSSL is
/// skipped there.
pub fn resolve(os: Os, options: &RecipeOptions) -> Vec<Requirement> {
    let mut requirements = vec![Requirement::new("zlib", "1.2.11")];

    if !matches!(os, Os::Macos | Os::Windows) {
        requirements.push(Requirement::new("openssl", "1.1.1h"));
    }

    if options.icu {
        requirements.push(Requirement::new("icu", "64.2"));
    }

    requirements
}
