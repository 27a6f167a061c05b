//! User configuration for the `revman` CLI (spec §6 ambient config
//! concern — not part of the retrieval core itself).
//!
//! Grounded directly on the teacher's `config.rs` (`ProbeConfig` /
//! `DefaultsConfig` / `SearchConfig` nested-`Option` shape, merged over
//! built-in defaults), trimmed from its seven sections down to the three
//! this crate needs. Uses TOML rather than the teacher's JSON — still a
//! `serde`-based format, more idiomatic for a small CLI tool's own config
//! file, and noted as a deliberate swap in the grounding ledger.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// All fields optional to support partial configs merged over defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RevmanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_nlp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_fuzzy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_terms_cap: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_platforms: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
}

impl RevmanConfig {
    /// Load from `path` if it exists; a missing file is not an error, it
    /// just means "use built-in defaults".
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// The conventional per-user config path: `~/.config/revman/revman.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("revman").join("revman.toml"))
    }

    pub fn search_limit(&self) -> Option<usize> {
        self.search.as_ref().and_then(|s| s.limit)
    }

    pub fn search_use_nlp(&self) -> Option<bool> {
        self.search.as_ref().and_then(|s| s.use_nlp)
    }

    pub fn search_use_fuzzy(&self) -> Option<bool> {
        self.search.as_ref().and_then(|s| s.use_fuzzy)
    }

    pub fn search_top_terms_cap(&self) -> Option<usize> {
        self.search.as_ref().and_then(|s| s.top_terms_cap)
    }

    pub fn search_all_platforms(&self) -> Option<bool> {
        self.search.as_ref().and_then(|s| s.all_platforms)
    }

    pub fn cache_capacity(&self) -> Option<usize> {
        self.cache.as_ref().and_then(|c| c.capacity)
    }

    pub fn cache_ttl_seconds(&self) -> Option<u64> {
        self.cache.as_ref().and_then(|c| c.ttl_seconds)
    }
}
