//! Harness settings loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::HarnessError;
use crate::locate::DEFAULT_MAX_DEPTH;
use crate::version::JavaVersion;

/// Settings shared by every context a generator creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessConfig {
    /// Version used when a caller does not name one.
    pub default_version: JavaVersion,
    /// Cap on single-child steps the locator takes.
    pub max_descent_depth: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            default_version: JavaVersion::LATEST,
            max_descent_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ---- TOML deserialization types ----

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    harness: Option<TomlHarness>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlHarness {
    default_version: Option<JavaVersion>,
    max_descent_depth: Option<i64>,
}

impl HarnessConfig {
    /// Parse a config from TOML text. Missing keys take their defaults.
    ///
    /// ```toml
    /// [harness]
    /// default_version = "1.8"
    /// max_descent_depth = 64
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, HarnessError> {
        Self::parse(text, None)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::config(format!("failed to read {}: {e}", path.display()), Some(path.to_path_buf()))
        })?;
        let config = Self::parse(&text, Some(path))?;
        tracing::debug!(path = %path.display(), ?config, "loaded harness config");
        Ok(config)
    }

    fn parse(text: &str, path: Option<&Path>) -> Result<Self, HarnessError> {
        let owned_path = || path.map(Path::to_path_buf);
        let raw: TomlConfig =
            toml::from_str(text).map_err(|e| HarnessError::config(e.message().to_string(), owned_path()))?;

        let mut config = Self::default();
        let Some(harness) = raw.harness else {
            return Ok(config);
        };

        if let Some(version) = harness.default_version {
            config.default_version = version;
        }
        if let Some(depth) = harness.max_descent_depth {
            if depth <= 0 {
                return Err(HarnessError::config(
                    format!("max_descent_depth must be positive, got {depth}"),
                    owned_path(),
                ));
            }
            config.max_descent_depth = usize::try_from(depth).map_err(|_| {
                HarnessError::config(format!("max_descent_depth {depth} is too large"), owned_path())
            })?;
        }
        Ok(config)
    }
}
