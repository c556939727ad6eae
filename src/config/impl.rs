use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults if
/// `init_config_from` was never called.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration from an explicit path
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load_from(path)));
}

/// Replace the global configuration (tests and reload paths)
pub fn set_config(config: StaticConfig) {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .store(Arc::new(config));
}
