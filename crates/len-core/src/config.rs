//! Configuration types for the toolchain.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identification printed by `--version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    /// `<arch>-<os>` of the running binary
    pub build_target: String,
    pub authors: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_target: format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
            authors: env!("CARGO_PKG_AUTHORS").replace(':', ", "),
        }
    }

    pub fn version_line(&self, name: &str) -> String {
        format!(
            "{} ({}, Built by {}) {}",
            name, self.build_target, self.authors, self.version
        )
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Locations of the external toolchains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Program invoked for the `g++` preset
    pub gxx_program: PathBuf,
    /// Visual Studio 2010 installation root
    pub vs2010_root: PathBuf,
    /// Windows SDK v7.0A root
    pub windows_sdk_root: PathBuf,
}

impl ToolchainConfig {
    /// Defaults, overridden by `LENC_GXX`, `LENC_VS2010_ROOT` and `LENC_WINSDK_ROOT`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(gxx) = std::env::var_os("LENC_GXX") {
            config.gxx_program = gxx.into();
        }
        if let Some(root) = std::env::var_os("LENC_VS2010_ROOT") {
            config.vs2010_root = root.into();
        }
        if let Some(root) = std::env::var_os("LENC_WINSDK_ROOT") {
            config.windows_sdk_root = root.into();
        }
        config
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            gxx_program: PathBuf::from("g++"),
            vs2010_root: PathBuf::from(r"C:\Program Files (x86)\Microsoft Visual Studio 10.0"),
            windows_sdk_root: PathBuf::from(r"C:\Program Files (x86)\Microsoft SDKs\Windows\v7.0A"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let toolchain = ToolchainConfig::default();
        assert_eq!(toolchain.gxx_program, PathBuf::from("g++"));
        assert!(toolchain.vs2010_root.to_string_lossy().contains("Visual Studio 10.0"));

        let info = BuildInfo::current();
        assert_eq!(info.version, "1.0.1");
        assert!(info.build_target.contains('-'));
    }

    #[test]
    fn test_version_line() {
        let info = BuildInfo {
            version: "1.0.1".to_string(),
            build_target: "x86_64-linux".to_string(),
            authors: "nezbednik".to_string(),
        };
        assert_eq!(
            info.version_line("lenc"),
            "lenc (x86_64-linux, Built by nezbednik) 1.0.1"
        );
    }
}
