//! Configuration module for the zcl scanner
//! Compile-time limits are generated from TOML by build.rs

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{ConfigError, LoggingPreferences, RuntimeConfig, ScannerPreferences};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("ZCL_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ZCL_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
