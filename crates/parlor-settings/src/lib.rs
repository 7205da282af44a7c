//! # parlor-settings
//!
//! Configuration for the Parlor relay, loaded from three layers (in
//! priority order):
//! 1. **Compiled defaults**: [`ParlorSettings::default()`]
//! 2. **Settings file**: `~/.parlor/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `PARLOR_*` overrides (highest priority)
//!
//! Command-line flags are applied on top by the binary.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings_from_path, settings_path};
pub use types::{LoggingSettings, ParlorSettings, ServerSettings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = ParlorSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }
}
