//! Build configuration module.
//!
//! Handles loading, validating and merging `font-delivery.toml`. A config file
//! is sparse: it overrides stock defaults, and every key it leaves out keeps
//! its default value.
//!
//! ## Config File Location
//!
//! Pass a file explicitly with `--config`, or place `font-delivery.toml` in the
//! working directory. With neither, the stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! api_version = "v2"        # Output tree lives under api/<api_version>/
//! subsets = ["latin", "latin-ext", "vietnamese", "cyrillic",
//!            "cyrillic-ext", "hebrew", "greek", "greek-ext"]
//! ignored_families = ["atma", "blinker", ...]   # Family ids left out of the catalog
//!
//! [css]
//! layout = "family"         # "family" → <id>.css, "fragments" → one file per block
//! class_selector = false    # Append `.font-<id>` to each family stylesheet
//!
//! [tools]
//! subsetter = "hb-subset"
//! compressor = "woff2_compress"
//!
//! [licenses]
//! copy = true               # Copy each family's license text to licenses/<id>-LICENSE.txt
//!
//! [processing]
//! max_processes = 4         # Max parallel family builds (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Only build Latin subsets
//! subsets = ["latin", "latin-ext"]
//! ```
//!
//! Unknown keys are rejected to catch typos early. Requested subsets are
//! checked against the range table at load time, so an unknown subset fails
//! the run before any file is written.

use crate::subsets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "font-delivery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `font-delivery.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Version segment of the output tree (`api/<version>/`).
    pub api_version: String,
    /// Subsets to build, in the order they appear in every emitted document.
    pub subsets: Vec<String>,
    /// Family ids removed after collection.
    pub ignored_families: Vec<String>,
    pub css: CssConfig,
    pub tools: ToolsConfig,
    pub licenses: LicensesConfig,
    pub processing: ProcessingConfig,
}

/// Families excluded from the catalog because their licensing is incomplete.
const DEFAULT_IGNORED_FAMILIES: &[&str] = &[
    "atma",
    "blinker",
    "chathura",
    "dela-gothic-one",
    "kulim-park",
    "mirza",
    "mitr",
    "mogra",
    "prata",
    "source-serif-4",
    "jsmath-cmr10",
    "jsmath-cmex10",
    "jsmath-cmsy10",
    "jsmath-cmti10",
    "jsmath-cmmi10",
    "jsmath-cmbx10",
    "uchen",
    "jomolhari",
];

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            api_version: "v2".to_string(),
            subsets: subsets::known_subsets().map(str::to_string).collect(),
            ignored_families: DEFAULT_IGNORED_FAMILIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            css: CssConfig::default(),
            tools: ToolsConfig::default(),
            licenses: LicensesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api_version must not be empty".into(),
            ));
        }
        if self.subsets.is_empty() {
            return Err(ConfigError::Validation("subsets must not be empty".into()));
        }
        for subset in &self.subsets {
            subsets::ranges(subset).map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        if self.tools.subsetter.trim().is_empty() || self.tools.compressor.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tools.subsetter and tools.compressor must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// How stylesheets are split into files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssLayout {
    /// One `<id>.css` per family.
    #[default]
    Family,
    /// One `<id>_<subset>_<weight>_<style>.css` per `@font-face` block.
    Fragments,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CssConfig {
    pub layout: CssLayout,
    /// Append a `.font-<id>` class to each family stylesheet. Has no effect
    /// with the fragment layout.
    pub class_selector: bool,
}

/// External tool binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub subsetter: String,
    pub compressor: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            subsetter: "hb-subset".to_string(),
            compressor: "woff2_compress".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LicensesConfig {
    pub copy: bool,
}

impl Default for LicensesConfig {
    fn default() -> Self {
        Self { copy: true }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of families built at once.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Stock defaults as a TOML value, the base every config file merges onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BuildConfig::default())?)
}

/// Deep-merge `overlay` onto `base`. Tables merge key by key; any other
/// value in the overlay replaces the base value (arrays are not concatenated).
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto `base`, deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An explicit path must exist. Without one, `font-delivery.toml` in `dir` is
/// used if present, otherwise the stock defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<BuildConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let implicit = dir.join(CONFIG_FILE);
            if implicit.exists() {
                Some(load_raw_config(&implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// A fully-commented stock `font-delivery.toml` with all keys and defaults.
pub fn stock_config_toml() -> &'static str {
    r##"# font-delivery Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Version segment of the output tree: <output>/api/<api_version>/
api_version = "v2"

# Subsets to build. Order is preserved in fonts.json, subsets.json and
# stylesheets. Every name must be one of:
#   latin, latin-ext, vietnamese, cyrillic, cyrillic-ext, hebrew, greek, greek-ext
subsets = ["latin", "latin-ext", "vietnamese", "cyrillic", "cyrillic-ext", "hebrew", "greek", "greek-ext"]

# Family ids left out of the catalog entirely.
ignored_families = [
    "atma", "blinker", "chathura", "dela-gothic-one", "kulim-park", "mirza",
    "mitr", "mogra", "prata", "source-serif-4", "jsmath-cmr10", "jsmath-cmex10",
    "jsmath-cmsy10", "jsmath-cmti10", "jsmath-cmmi10", "jsmath-cmbx10", "uchen",
    "jomolhari",
]

# ---------------------------------------------------------------------------
# Stylesheets
# ---------------------------------------------------------------------------
[css]
# "family"    -> one fonts/<id>.css per family
# "fragments" -> one fonts/<id>_<subset>_<weight>_<style>.css per @font-face
layout = "family"

# Append `.font-<id> { font-family: "<name>"; }` to each family stylesheet.
class_selector = false

# ---------------------------------------------------------------------------
# External tools
# ---------------------------------------------------------------------------
[tools]
# Called as: <subsetter> --unicodes-file=<ranges> --output-file=<out> <font>
subsetter = "hb-subset"

# Called as: <compressor> <font>, writing <font stem>.woff2 next to it.
compressor = "woff2_compress"

# ---------------------------------------------------------------------------
# Licenses
# ---------------------------------------------------------------------------
[licenses]
# Copy OFL.txt / LICENSE.txt / UFL.txt to licenses/<id>-LICENSE.txt
copy = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of families built in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
