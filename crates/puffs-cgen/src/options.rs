use serde::{Deserialize, Serialize};

/// The ABI version token new packages are built against.
pub const DEFAULT_VERSION: u32 = 0x00001;

/// Knobs for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenOptions {
    /// Value of `PUFFS_VERSION`; constructors reject any other token.
    pub version: u32,
}

impl GenOptions {
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let opts: GenOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, GenOptions::default());
        let opts: GenOptions = serde_json::from_str(r#"{"version": 7}"#).unwrap();
        assert_eq!(opts.version, 7);
    }
}
