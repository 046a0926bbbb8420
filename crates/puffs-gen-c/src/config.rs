//! Pipeline configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default:
//!
//! ```json
//! {
//!   "gen": { "version": 1 },
//!   "formatter": { "program": "clang-format", "style": "Chromium", "enabled": true }
//! }
//! ```

use std::path::Path;

use puffs_cgen::GenOptions;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::format::{ClangFormat, Formatter, Unformatted};

/// Everything one compilation run needs besides the package itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub gen: GenOptions,
    pub formatter: FormatterConfig,
}

/// Which external formatter to run, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub program: String,
    pub style: String,
    /// When false the generated text is emitted as is.
    pub enabled: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        let clang = ClangFormat::default();
        Self {
            program: clang.program,
            style: clang.style,
            enabled: true,
        }
    }
}

impl CompilerConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let text = std::fs::read_to_string(path).map_err(|source| CompileError::Config {
            path: path.display().to_string(),
            message: source.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|source| CompileError::Config {
            path: path.display().to_string(),
            message: source.to_string(),
        })
    }

    /// The formatter this config selects.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        if self.formatter.enabled {
            Box::new(ClangFormat::new(
                self.formatter.program.clone(),
                self.formatter.style.clone(),
            ))
        } else {
            Box::new(Unformatted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        let config: CompilerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CompilerConfig::default());
        assert!(config.formatter.enabled);
        assert_eq!(config.formatter.program, "clang-format");
        assert_eq!(config.gen.version, puffs_cgen::options::DEFAULT_VERSION);
    }

    #[test]
    fn partial_formatter_section_keeps_other_defaults() {
        let config: CompilerConfig =
            serde_json::from_str(r#"{"formatter": {"style": "Google"}}"#).unwrap();
        assert_eq!(config.formatter.style, "Google");
        assert_eq!(config.formatter.program, "clang-format");
    }

    #[test]
    fn disabled_formatter_passes_text_through() {
        let mut config = CompilerConfig::default();
        config.formatter.enabled = false;
        let text = "int  x ;\n";
        assert_eq!(config.formatter().format(text).unwrap(), text);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = CompilerConfig::load(Path::new("/nonexistent/puffs.json")).unwrap_err();
        assert!(matches!(err, CompileError::Config { .. }), "{err}");
    }
}
