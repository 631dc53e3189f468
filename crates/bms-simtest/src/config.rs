//! Configuration loader for the simulation harness.
//!
//! All runtime settings come from environment variables, optionally
//! populated from a `.env` file by the caller, so the harness can be
//! pointed at a different scenario without recompiling.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Parse an optional unsigned integer environment variable with a default value.
macro_rules! parse_env {
    ($ty:ty, $var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Harness settings, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Simulated minutes to run the scenario for.
    pub minutes: u32,

    /// Seed for the demo campus reading generator.
    pub seed: u64,

    /// Save file to load instead of generating the demo campus.
    pub save_file: Option<PathBuf>,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `BMS_MINUTES` – minutes to simulate (default: 120)
/// - `BMS_SEED` – demo campus seed (default: 42)
/// - `BMS_SAVE_FILE` – path of a save file to load
///
/// Returns an error if a variable is set but cannot be parsed.
pub fn load_from_env() -> Result<HarnessConfig> {
    let minutes = parse_env!(u32, "BMS_MINUTES", 120);
    let seed = parse_env!(u64, "BMS_SEED", 42);
    let save_file = env::var("BMS_SAVE_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    if minutes == 0 {
        return Err(anyhow!("Invalid BMS_MINUTES: must be at least 1"));
    }

    Ok(HarnessConfig {
        minutes,
        seed,
        save_file,
    })
}

impl HarnessConfig {
    /// Log the loaded configuration.
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  BMS_MINUTES   : {}", self.minutes);
        tracing::info!("  BMS_SEED      : {}", self.seed);
        match &self.save_file {
            Some(path) => tracing::info!("  BMS_SAVE_FILE : {}", path.display()),
            None => tracing::info!("  BMS_SAVE_FILE : (demo campus)"),
        }
    }
}
