// build.rs - TOML-driven constant generation for scanner and logging limits
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_reported_error_tokens: usize,
    token_capacity_divisor: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_source: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ZCL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ZCL_CONFIG_DIR");

    let profile = env::var("ZCL_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ZCL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the zcl_scanner directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_constraints(&config);
    generate_constants(&config, &profile);
}

fn validate_constraints(config: &CompileTimeConfig) {
    if config.lexical.token_capacity_divisor == 0 {
        panic!("token_capacity_divisor must be at least 1");
    }

    if config.logging.max_log_events_per_source > config.logging.log_buffer_size {
        panic!("max_log_events_per_source exceeds log_buffer_size");
    }

    if config.logging.max_log_message_length < 64 {
        panic!("max_log_message_length too small (min: 64)");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_REPORTED_ERROR_TOKENS: usize = {};
        pub const TOKEN_CAPACITY_DIVISOR: usize = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_SOURCE: usize = {};
    }}
}}
"#,
        profile,
        config.lexical.max_reported_error_tokens,
        config.lexical.token_capacity_divisor,
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_source,
    );

    fs::write(output_path, constants_code).unwrap();
}
