//! Compiler configuration: target sizing and project paths.
//!
//! These values have no effect on parsing except `pointer_width` and
//! `native_int_width`, which size pointer/reference/slice/optional/
//! function-value types and determine the concrete width `int`/`uint`
//! map to.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Target-dependent sizing plus environment the compiler object carries.
/// Built with a small validating builder, mirroring the construction-time
/// validation habit used elsewhere in this crate (e.g. keyword reservation
/// in [`crate::symbol::Keywords::install`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub pointer_width: u64,
    pub native_int_width: u64,
    pub root_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub verbose: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            pointer_width: 8,
            native_int_width: 8,
            root_dir: PathBuf::from("."),
            cache_dir: PathBuf::from(".vesper-cache"),
            verbose: false,
        }
    }
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid compiler configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl CompilerConfig {
    pub fn builder() -> CompilerConfigBuilder {
        CompilerConfigBuilder::default()
    }

    /// Parses a `vesper.toml` project file.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: CompilerConfig = toml::from_str(text).map_err(|e| ConfigError(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.pointer_width, 1 | 2 | 4 | 8) {
            return Err(ConfigError(format!(
                "pointer_width must be one of 1, 2, 4, 8 (got {})",
                self.pointer_width
            )));
        }
        if !matches!(self.native_int_width, 1 | 2 | 4 | 8) {
            return Err(ConfigError(format!(
                "native_int_width must be one of 1, 2, 4, 8 (got {})",
                self.native_int_width
            )));
        }
        Ok(())
    }
}

/// Builder for [`CompilerConfig`]; each `with_*` validates eagerly so a
/// malformed value is reported at the call site that set it rather than
/// at first use.
#[derive(Default)]
pub struct CompilerConfigBuilder {
    cfg: CompilerConfig,
}

impl CompilerConfigBuilder {
    pub fn with_pointer_width(mut self, width: u64) -> Result<Self, ConfigError> {
        if !matches!(width, 1 | 2 | 4 | 8) {
            return Err(ConfigError(format!("unsupported pointer width {width}")));
        }
        self.cfg.pointer_width = width;
        Ok(self)
    }

    pub fn with_native_int_width(mut self, width: u64) -> Result<Self, ConfigError> {
        if !matches!(width, 1 | 2 | 4 | 8) {
            return Err(ConfigError(format!("unsupported native int width {width}")));
        }
        self.cfg.native_int_width = width;
        Ok(self)
    }

    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.root_dir = dir.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.cache_dir = dir.into();
        self
    }

    pub fn verbose(mut self, v: bool) -> Self {
        self.cfg.verbose = v;
        self
    }

    pub fn build(self) -> CompilerConfig {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_64_bit() {
        let cfg = CompilerConfig::default();
        assert_eq!(cfg.pointer_width, 8);
        assert_eq!(cfg.native_int_width, 8);
    }

    #[test]
    fn builder_rejects_bad_pointer_width() {
        let err = CompilerConfig::builder().with_pointer_width(3);
        assert!(err.is_err());
    }

    #[test]
    fn builder_accepts_narrow_target() {
        let cfg = CompilerConfig::builder()
            .with_pointer_width(4)
            .unwrap()
            .with_native_int_width(4)
            .unwrap()
            .build();
        assert_eq!(cfg.pointer_width, 4);
    }

    #[test]
    fn parses_vesper_toml() {
        let text = "pointer_width = 4\nnative_int_width = 4\nverbose = true\n";
        let cfg = CompilerConfig::from_toml_str(text).unwrap();
        assert_eq!(cfg.pointer_width, 4);
        assert!(cfg.verbose);
    }

    #[test]
    fn rejects_invalid_toml_values() {
        let text = "pointer_width = 3\n";
        assert!(CompilerConfig::from_toml_str(text).is_err());
    }
}
