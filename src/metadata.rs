// src/metadata.rs

//! Published package metadata
//!
//! This is the recipe's publish stage: a pure, derived view of the
//! resolved options and target OS that downstream build graphs consume.
//! No I/O happens here; the same inputs always produce the same metadata.
//!
//! Library names differ by linkage mode (static builds carry a `-static`
//! infix and require the `*_STATIC` preprocessor defines), and each OS
//! family contributes its own system libraries or frameworks.

use crate::options::RecipeOptions;
use crate::settings::Os;
use serde::{Deserialize, Serialize};

/// Link-and-include metadata published for downstream consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Library names to link, in link order
    pub libs: Vec<String>,
    /// Include directories relative to the package root
    pub includedirs: Vec<String>,
    /// Preprocessor defines required by consumers
    pub defines: Vec<String>,
    /// OS system libraries to link
    pub system_libs: Vec<String>,
    /// macOS frameworks to link
    pub frameworks: Vec<String>,
}

impl PackageInfo {
    /// Derive the published metadata for a target OS and option set
    pub fn resolve(os: Os, options: &RecipeOptions) -> Self {
        let mut libs = if options.shared {
            vec!["mongoc-1.0".to_string(), "bson-1.0".to_string()]
        } else {
            vec![
                "mongoc-static-1.0".to_string(),
                "bson-static-1.0".to_string(),
            ]
        };

        // Static consumers link ICU directly, so its libraries join the
        // published link set
        if options.icu && !options.shared {
            let icu_libs: &[&str] = if os == Os::Windows {
                &["icuuc", "icudt"]
            } else {
                &["icuuc", "icudata"]
            };
            libs.extend(icu_libs.iter().map(|s| s.to_string()));
        }

        let includedirs = vec![
            "include/libmongoc-1.0".to_string(),
            "include/libbson-1.0".to_string(),
        ];

        let mut defines = Vec::new();
        let mut system_libs = Vec::new();
        let mut frameworks = Vec::new();

        if os == Os::Macos {
            frameworks.push("CoreFoundation".to_string());
            frameworks.push("Security".to_string());
        }

        if os == Os::Linux {
            system_libs.extend(["rt", "pthread", "dl"].map(String::from));
        }

        if !options.shared {
            defines.push("BSON_STATIC=1".to_string());
            defines.push("MONGOC_STATIC=1".to_string());

            if matches!(os, Os::Linux | Os::Macos) {
                system_libs.push("resolv".to_string());
            }

            if os == Os::Windows {
                system_libs.extend(
                    ["ws2_32", "secur32", "crypt32", "bcrypt", "dnsapi"].map(String::from),
                );
            }
        }

        Self {
            libs,
            includedirs,
            defines,
            system_libs,
            frameworks,
        }
    }
}
