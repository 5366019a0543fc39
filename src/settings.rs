// src/settings.rs

//! Target settings: OS, architecture, and build type
//!
//! Settings describe the machine the artifact is built for. They are
//! normally detected from the host but can be overridden (the `info`
//! command resolves metadata for arbitrary targets without building).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system of the build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
    FreeBsd,
}

impl Os {
    /// Detect the host operating system
    pub fn host() -> Result<Self> {
        match std::env::consts::OS {
            "linux" => Ok(Os::Linux),
            "macos" => Ok(Os::Macos),
            "windows" => Ok(Os::Windows),
            "freebsd" => Ok(Os::FreeBsd),
            other => Err(Error::Unsupported(format!("host OS: {}", other))),
        }
    }

    /// All supported operating systems
    pub fn all() -> [Os; 4] {
        [Os::Linux, Os::Macos, Os::Windows, Os::FreeBsd]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Windows => "windows",
            Os::FreeBsd => "freebsd",
        }
    }

    /// Unix-family targets (everything but Windows)
    pub fn is_unix(&self) -> bool {
        !matches!(self, Os::Windows)
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" => Ok(Os::Macos),
            "windows" => Ok(Os::Windows),
            "freebsd" => Ok(Os::FreeBsd),
            other => Err(Error::Unsupported(format!("OS: {}", other))),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture of the build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    /// Detect the host architecture
    pub fn host() -> Result<Self> {
        match std::env::consts::ARCH {
            "x86_64" => Ok(Arch::X86_64),
            "aarch64" => Ok(Arch::Aarch64),
            other => Err(Error::Unsupported(format!("host arch: {}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build type, mapped to `CMAKE_BUILD_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Debug,
    #[default]
    Release,
}

impl BuildType {
    /// The value passed to CMake
    pub fn cmake_value(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            other => Err(Error::Unsupported(format!("build type: {}", other))),
        }
    }
}

/// Resolved settings for one recipe invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub build_type: BuildType,
    /// C++ standard library selection, if the host tool passed one
    pub libcxx: Option<String>,
    /// C++ language standard, if the host tool passed one
    pub cppstd: Option<String>,
}

impl Settings {
    /// Detect settings from the host machine
    pub fn detect() -> Result<Self> {
        Ok(Self {
            os: Os::host()?,
            arch: Arch::host()?,
            build_type: BuildType::default(),
            libcxx: None,
            cppstd: None,
        })
    }

    /// Settings for an explicit target OS, host values elsewhere
    pub fn for_os(os: Os) -> Result<Self> {
        Ok(Self {
            os,
            arch: Arch::host()?,
            build_type: BuildType::default(),
            libcxx: None,
            cppstd: None,
        })
    }

    /// Drop C++ settings: the wrapped library is pure C, a C++ standard
    /// or standard library choice does not apply to its ABI.
    pub fn strip_cxx(&mut self) {
        self.libcxx = None;
        self.cppstd = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_parse_roundtrip() {
        for os in Os::all() {
            assert_eq!(os.as_str().parse::<Os>().unwrap(), os);
        }
        // darwin is accepted as an alias
        assert_eq!("darwin".parse::<Os>().unwrap(), Os::Macos);
        assert!("plan9".parse::<Os>().is_err());
    }

    #[test]
    fn test_os_is_unix() {
        assert!(Os::Linux.is_unix());
        assert!(Os::Macos.is_unix());
        assert!(Os::FreeBsd.is_unix());
        assert!(!Os::Windows.is_unix());
    }

    #[test]
    fn test_build_type_parse() {
        assert_eq!("release".parse::<BuildType>().unwrap(), BuildType::Release);
        assert_eq!("Debug".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert_eq!(BuildType::default(), BuildType::Release);
        assert!("profile".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_strip_cxx_clears_both() {
        let mut settings = Settings {
            os: Os::Linux,
            arch: Arch::X86_64,
            build_type: BuildType::Release,
            libcxx: Some("libstdc++11".to_string()),
            cppstd: Some("17".to_string()),
        };

        settings.strip_cxx();
        assert!(settings.libcxx.is_none());
        assert!(settings.cppstd.is_none());
    }

    #[test]
    fn test_detect_host() {
        // Should succeed on any platform the test suite runs on
        let settings = Settings::detect().unwrap();
        assert!(settings.libcxx.is_none());
        assert!(settings.cppstd.is_none());
    }
}
