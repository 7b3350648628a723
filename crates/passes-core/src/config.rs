use crate::errors::QueryError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;

pub const DEFAULT_PROJECT: &str = "chrome-unexpected-pass-data";
pub const DEFAULT_NUM_SAMPLES: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PassesConfig {
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    #[serde(default)]
    pub large_query_mode: bool,
    #[serde(default = "default_bq_binary")]
    pub bq_binary: String,
    #[serde(default)]
    pub builders: BuilderLists,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuilderLists {
    #[serde(default)]
    pub ci: Vec<String>,
    #[serde(default, rename = "try")]
    pub try_: Vec<String>,
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

fn default_num_samples() -> usize {
    DEFAULT_NUM_SAMPLES
}

fn default_bq_binary() -> String {
    "bq".to_string()
}

impl Default for PassesConfig {
    fn default() -> Self {
        Self {
            project: default_project(),
            num_samples: default_num_samples(),
            large_query_mode: false,
            bq_binary: default_bq_binary(),
            builders: BuilderLists::default(),
        }
    }
}

impl PassesConfig {
    /// Applies `UNEXPECTED_PASSES_PROJECT` and `UNEXPECTED_PASSES_NUM_SAMPLES`.
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = env::var("UNEXPECTED_PASSES_PROJECT") {
            if !v.is_empty() {
                self.project = v;
            }
        }
        if let Ok(v) = env::var("UNEXPECTED_PASSES_NUM_SAMPLES") {
            if let Ok(n) = v.parse() {
                self.num_samples = n;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.project.trim().is_empty() {
            return Err(QueryError::Config("project must not be empty".into()));
        }
        if self.num_samples == 0 {
            return Err(QueryError::Config("num_samples must be positive".into()));
        }
        Ok(())
    }
}

/// Loads a YAML config file. Unknown keys are an error in strict mode and a
/// warning otherwise.
pub fn load_config(path: &Path, strict: bool) -> Result<PassesConfig, QueryError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| QueryError::Config(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = HashSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);
    let cfg: PassesConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.insert(p.to_string());
    })
    .map_err(|e| QueryError::Config(format!("failed to parse YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        let mut keys: Vec<_> = ignored_keys.into_iter().collect();
        keys.sort();
        if strict {
            return Err(QueryError::Config(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                keys,
                path.display()
            )));
        }
        tracing::warn!(event = "config_unknown_keys", keys = ?keys, file = %path.display());
    }

    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let f = write_tmp("large_query_mode: true\n");
        let cfg = load_config(f.path(), true).unwrap();
        assert_eq!(cfg.project, DEFAULT_PROJECT);
        assert_eq!(cfg.num_samples, DEFAULT_NUM_SAMPLES);
        assert!(cfg.large_query_mode);
        assert_eq!(cfg.bq_binary, "bq");
    }

    #[test]
    fn test_builder_lists() {
        let f = write_tmp("builders:\n  ci: [\"Linux Release (NVIDIA)\"]\n  try: [linux-rel]\n");
        let cfg = load_config(f.path(), true).unwrap();
        assert_eq!(cfg.builders.ci, vec!["Linux Release (NVIDIA)"]);
        assert_eq!(cfg.builders.try_, vec!["linux-rel"]);
    }

    #[test]
    fn test_unknown_keys_strict_vs_lenient() {
        let f = write_tmp("project: p\nbogus: 1\n");
        let err = load_config(f.path(), true).unwrap_err();
        assert!(err.to_string().contains("bogus"));
        assert_eq!(load_config(f.path(), false).unwrap().project, "p");
    }

    #[test]
    fn test_zero_samples_rejected() {
        let f = write_tmp("num_samples: 0\n");
        assert!(matches!(load_config(f.path(), false), Err(QueryError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/passes.yaml"), false).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
