// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mahmock.toml` > `~/.config/mahmock/mahmock.toml` > `/etc/mahmock/mahmock.toml`
//! with environment variable overrides via `MAHMOCK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MahmockConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mahmock/mahmock.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "mahmock.toml";

/// `~/.config/mahmock/mahmock.toml`, if a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mahmock/mahmock.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mahmock/mahmock.toml`
/// 3. `~/.config/mahmock/mahmock.toml`
/// 4. `./mahmock.toml`
/// 5. `MAHMOCK_*` environment variables
pub fn load_config() -> Result<MahmockConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MahmockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MahmockConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MahmockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MahmockConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MahmockConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Map `MAHMOCK_<SECTION>_<KEY>` onto `section.key`.
///
/// Uses `Env::map()` rather than `split("_")` so keys containing underscores
/// survive: `MAHMOCK_SERVER_VERIFY_KEY` is `server.verify_key`.
fn env_provider() -> Env {
    Env::prefixed("MAHMOCK_").map(|key| {
        let mapped = map_env_key(key.as_str());
        mapped.into()
    })
}

fn map_env_key(key: &str) -> String {
    for section in ["server", "logging", "feed"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("server_verify_key"), "server.verify_key");
        assert_eq!(map_env_key("feed_delay_ms"), "feed.delay_ms");
        assert_eq!(map_env_key("logging_level"), "logging.level");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
