//! Configuration loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::allocation::RetakePolicy;

/// Top-level degreecheck configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreecheckConfig {
    /// Directory holding `courses/` and `requirements/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Output directory for saved reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// How repeated enrollments in one course are counted.
    #[serde(default)]
    pub retake_policy: RetakePolicy,
    /// Minimum GPA for the major.
    #[serde(default = "default_major_gpa")]
    pub major_gpa_threshold: f64,
    /// Minimum GPA for a minor unless overridden.
    #[serde(default = "default_minor_gpa")]
    pub minor_gpa_threshold: f64,
    /// Per-minor GPA thresholds keyed by minor code.
    #[serde(default = "default_minor_overrides")]
    pub minor_gpa_overrides: BTreeMap<String, f64>,
    /// Extra SU credit required when a program is taken as a second major.
    #[serde(default = "default_double_major_su")]
    pub double_major_extra_su: f64,
    /// Extra ECTS required when a program is taken as a second major.
    #[serde(default = "default_double_major_ects")]
    pub double_major_extra_ects: f64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./degreecheck-results")
}
fn default_major_gpa() -> f64 {
    2.00
}
fn default_minor_gpa() -> f64 {
    2.72
}
fn default_minor_overrides() -> BTreeMap<String, f64> {
    BTreeMap::from([("ENTREP-MINOR".to_string(), 2.50)])
}
fn default_double_major_su() -> f64 {
    30.0
}
fn default_double_major_ects() -> f64 {
    60.0
}

impl Default for DegreecheckConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            retake_policy: RetakePolicy::default(),
            major_gpa_threshold: default_major_gpa(),
            minor_gpa_threshold: default_minor_gpa(),
            minor_gpa_overrides: default_minor_overrides(),
            double_major_extra_su: default_double_major_su(),
            double_major_extra_ects: default_double_major_ects(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration.
///
/// Search order:
/// 1. `path`, which must exist when given
/// 2. `degreecheck.toml` in the current directory
/// 3. `~/.config/degreecheck/config.toml`
///
/// `DEGREECHECK_DATA_DIR` overrides the data directory.
pub fn load_config_from(path: Option<&Path>) -> Result<DegreecheckConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("degreecheck.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<DegreecheckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => DegreecheckConfig::default(),
    };

    if let Ok(dir) = std::env::var("DEGREECHECK_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("degreecheck"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_DEGREECHECK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_DEGREECHECK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_DEGREECHECK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("open ${brace"), "open ${brace");
        std::env::remove_var("_DEGREECHECK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = DegreecheckConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.retake_policy, RetakePolicy::CountOnce);
        assert_eq!(config.major_gpa_threshold, 2.0);
        assert_eq!(config.minor_gpa_threshold, 2.72);
        assert_eq!(config.minor_gpa_overrides.get("ENTREP-MINOR"), Some(&2.50));
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
data_dir = "/srv/degree-data"
retake_policy = "count_each"
minor_gpa_threshold = 3.0

[minor_gpa_overrides]
PSY-MINOR = 2.0
"#;
        let config: DegreecheckConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/degree-data"));
        assert_eq!(config.retake_policy, RetakePolicy::CountEach);
        assert_eq!(config.minor_gpa_threshold, 3.0);
        assert_eq!(
            config.minor_gpa_overrides,
            BTreeMap::from([("PSY-MINOR".to_string(), 2.0)])
        );
        assert_eq!(config.double_major_extra_su, 30.0);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));

        let path = dir.path().join("degreecheck.toml");
        std::fs::write(&path, "output_dir = \"out\"\nmajor_gpa_threshold = 2.5\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.major_gpa_threshold, 2.5);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
