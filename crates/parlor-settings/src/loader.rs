//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ParlorSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ParlorSettings;

/// Largest `PARLOR_MAX_MESSAGE_SIZE` accepted (1 GiB).
const MAX_MESSAGE_SIZE_LIMIT: usize = 1 << 30;

/// Resolve the default settings file path (`~/.parlor/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".parlor").join("settings.json")
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an invalid merged value
/// is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ParlorSettings> {
    let mut settings = read_file_layer(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults with the settings file (if any) merged on top.
fn read_file_layer(path: &Path) -> Result<ParlorSettings> {
    let defaults = serde_json::to_value(ParlorSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Overlay `source` on `target` and return the result.
///
/// Objects merge key by key, everything else is replaced, and `null` in
/// `source` never overwrites anything.
pub fn deep_merge(mut target: Value, source: Value) -> Value {
    overlay(&mut target, source);
    target
}

fn overlay(slot: &mut Value, incoming: Value) {
    match (slot, incoming) {
        (_, Value::Null) => {}
        (Value::Object(existing), Value::Object(fields)) => {
            for (key, value) in fields {
                match existing.get_mut(&key) {
                    Some(inner) => overlay(inner, value),
                    None if value.is_null() => {}
                    None => {
                        let _ = existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Apply `PARLOR_*` environment variable overrides.
///
/// Invalid values are logged and ignored (the file/default value stays).
pub fn apply_env_overrides(settings: &mut ParlorSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
///
/// Split out from [`apply_env_overrides`] so tests never touch the process
/// environment.
pub fn apply_overrides(settings: &mut ParlorSettings, lookup: impl Fn(&str) -> Option<String>) {
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Server settings ─────────────────────────────────────────────
    if let Some(v) = string("PARLOR_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = string("PARLOR_PORT") {
        match parse_in_range(&v, 1..=u16::MAX) {
            Some(port) => settings.server.port = port,
            None => invalid("PARLOR_PORT", &v),
        }
    }
    if let Some(v) = string("PARLOR_WS_PATH") {
        settings.server.ws_path = v;
    }
    if let Some(v) = string("PARLOR_STATIC_DIR") {
        settings.server.static_dir = v;
    }
    if let Some(v) = string("PARLOR_MAX_MESSAGE_SIZE") {
        match parse_in_range(&v, 1..=MAX_MESSAGE_SIZE_LIMIT) {
            Some(size) => settings.server.max_message_size = size,
            None => invalid("PARLOR_MAX_MESSAGE_SIZE", &v),
        }
    }

    // ── Logging settings ────────────────────────────────────────────
    if let Some(v) = string("PARLOR_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = string("PARLOR_LOG_JSON") {
        match parse_bool(&v) {
            Some(json) => settings.logging.json = json,
            None => invalid("PARLOR_LOG_JSON", &v),
        }
    }
}

fn invalid(key: &str, value: &str) {
    tracing::warn!(key, value, "invalid env var, ignoring");
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Read an on/off flag, ignoring case and surrounding whitespace.
///
/// `true`, `1`, `yes`, `on` and `false`, `0`, `no`, `off` are understood.
pub fn parse_bool(val: &str) -> Option<bool> {
    const ON: [&str; 4] = ["true", "1", "yes", "on"];
    const OFF: [&str; 4] = ["false", "0", "no", "off"];
    let val = val.trim();
    if ON.iter().any(|word| word.eq_ignore_ascii_case(val)) {
        Some(true)
    } else if OFF.iter().any(|word| word.eq_ignore_ascii_case(val)) {
        Some(false)
    } else {
        None
    }
}

/// Parse a number and keep it only if it falls inside `range`.
pub fn parse_in_range<T>(val: &str, range: RangeInclusive<T>) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    val.trim().parse().ok().filter(|n| range.contains(n))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
