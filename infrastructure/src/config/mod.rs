//! Configuration file loading for a2a-bridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `A2A_BRIDGE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./a2a-bridge.toml` or `./.a2a-bridge.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/a2a-bridge/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBridgeConfig, FileConfig, FileEtiquetteRules, FileRateLimit,
    FileRateLimitsConfig, FileTrustConfig, FileZoneSeed,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
