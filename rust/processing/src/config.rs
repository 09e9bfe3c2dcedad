// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables or JSON.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tilecontext_geometry::{ClassifierConfig, TrimMode};

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Query box buffer, as a fraction of the half-extent per axis.
    pub margin: f64,
    /// Side of the bounding solid to keep.
    pub keep: TrimMode,
    /// Fail when no tile overlaps the buffered query box.
    pub require_tiles: bool,
    /// Distance under which a vertex counts as lying on the bounding surface.
    pub epsilon: f64,
    /// Classify vertices on the rayon thread pool.
    pub parallel: bool,
    /// File name prefix of tile OBJ files (`<prefix><id>.obj`).
    pub tile_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            margin: 0.1,
            keep: TrimMode::KeepInside,
            require_tiles: true,
            epsilon: 1e-9,
            parallel: true,
            tile_prefix: "tile_".into(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            margin: var("TILECONTEXT_MARGIN")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.margin),
            keep: var("TILECONTEXT_KEEP")
                .and_then(|v| TrimMode::parse(&v))
                .unwrap_or(defaults.keep),
            require_tiles: var("TILECONTEXT_REQUIRE_TILES")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.require_tiles),
            epsilon: var("TILECONTEXT_EPSILON")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.epsilon),
            parallel: var("TILECONTEXT_PARALLEL")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.parallel),
            tile_prefix: var("TILECONTEXT_TILE_PREFIX").unwrap_or(defaults.tile_prefix),
        }
    }

    /// Parse a JSON config file; missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::Config(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "epsilon must be a non-negative number, got {}",
                self.epsilon
            )));
        }
        if self.tile_prefix.contains(&['/', '\\'][..]) {
            return Err(Error::Config(format!(
                "tile prefix must not contain path separators: {:?}",
                self.tile_prefix
            )));
        }
        Ok(())
    }

    /// Classifier settings derived from this configuration.
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            epsilon: self.epsilon,
            parallel: self.parallel,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
