//! Engine configuration
//!
//! Configuration is loaded from JSON or YAML. Every field has a default, so a
//! file only has to name what it overrides:
//!
//! ```yaml
//! max_depth: 32
//! coercions:
//!   - type: int
//!     convertFn: .@tonum
//!   - type: decimal
//!     convertFn: .@tostring
//! ```

use crate::transfer::{TransferType, TransferTypes};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default nesting limit for evaluated projection expressions
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings shared by the projection compiler and the function invoker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Declared type → coercion suffix table used by the compiler
    pub coercions: TransferTypes,

    /// Maximum literal nesting accepted by the evaluator
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coercions: TransferTypes::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Configuration {
            message: format!("Invalid JSON configuration: {}", e),
            source: Some(e.into()),
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Configuration {
            message: format!("Invalid YAML configuration: {}", e),
            source: Some(e.into()),
        })
    }

    /// Load a configuration file; `.yaml`/`.yml` files are read as YAML,
    /// everything else as JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Add or replace the coercion registered for `kind`
    pub fn with_coercion(mut self, kind: impl Into<String>, convert_fn: impl Into<String>) -> Self {
        let coercion = TransferType::new(kind, convert_fn);
        let mut types: Vec<TransferType> = self
            .coercions
            .iter()
            .filter(|t| !t.kind.eq_ignore_ascii_case(&coercion.kind))
            .cloned()
            .collect();
        types.push(coercion);
        self.coercions = TransferTypes::new(types);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Configuration {
                message: "max_depth must be greater than zero".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(
            config.coercions.get_by_type("int").map(|t| t.convert_fn.as_str()),
            Some(".@tonum")
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.coercions, TransferTypes::default());
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "max_depth: 16\ncoercions:\n  - type: decimal\n    convertFn: .@tostring"
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_depth, 16);
        assert!(config.coercions.get_by_type("int").is_none());
        assert_eq!(
            config.coercions.get_by_type("DECIMAL").map(|t| t.convert_fn.as_str()),
            Some(".@tostring")
        );
    }

    #[test]
    fn test_load_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_depth": 4}}"#).unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_invalid_configuration() {
        let err = EngineConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_depth": 0}}"#).unwrap();
        assert!(matches!(
            EngineConfig::load(file.path()),
            Err(Error::Configuration { .. })
        ));

        let missing = EngineConfig::load(Path::new("/nonexistent/pathmap.json"));
        assert!(matches!(missing, Err(Error::Io { .. })));
    }

    #[test]
    fn test_with_coercion_replaces_existing() {
        let config = EngineConfig::default().with_coercion("INT", ".@tostring");
        assert_eq!(
            config.coercions.get_by_type("int").map(|t| t.convert_fn.as_str()),
            Some(".@tostring")
        );
        assert_eq!(config.coercions.iter().filter(|t| t.kind.eq_ignore_ascii_case("int")).count(), 1);
    }
}
