use crate::defaults::{self, DefaultPatterns};
use crate::error::{AppError, Result};
use crate::matcher::MatchEngine;
use crate::rules::{PatternAggregator, RuleOrigin, RuleSet};
use byte_unit::Byte;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_DIR: &str = ".dirscribe";
pub const DEFAULT_CONFIG_FILENAME: &str = "dirscribe.toml";
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
    #[serde(default = "default_true")]
    pub enable_default_ignores: bool,
    /// Falls back to the built-in catalogue's limit when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            use_gitignore: default_true(),
            enable_default_ignores: default_true(),
            max_file_size: None,
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        let resolved = path_to_resolve.canonicalize().map_err(|e| {
            AppError::InvalidArgument(format!(
                "Failed to resolve project root '{}': {}",
                path_to_resolve.display(),
                e
            ))
        })?;
        if !resolved.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "Project root is not a directory: {}",
                resolved.display()
            )));
        }
        Ok(resolved)
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if !path.is_absolute() && !path.exists() {
                    path = project_root.join(&path);
                }
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_content).map_err(|e| AppError::TomlParse(e.to_string()))
    }

    pub fn max_file_size_bytes(&self) -> Result<u64> {
        match &self.general.max_file_size {
            Some(size) => parse_size(size),
            None => Ok(defaults::max_file_size_bytes()),
        }
    }

    /// Aggregates the rule set this configuration describes for `root`.
    pub fn build_rule_set(&self, root: &Path, defaults: &DefaultPatterns) -> RuleSet {
        PatternAggregator::new(defaults)
            .include_defaults(self.general.enable_default_ignores)
            .use_gitignore(self.general.use_gitignore)
            .extra_patterns(&self.filters.exclude, RuleOrigin::Config)
            .build_rule_set(root)
    }

    /// Rule set plus compiled engine for `root`, using the built-in catalogue.
    pub fn build_engine(&self, root: &Path) -> Result<(RuleSet, MatchEngine)> {
        self.build_engine_with(root, &RuleSet::new())
    }

    /// Like [`Config::build_engine`], with additional caller-supplied rules.
    pub fn build_engine_with(&self, root: &Path, extra: &RuleSet) -> Result<(RuleSet, MatchEngine)> {
        let max_file_size = self.max_file_size_bytes()?;
        let mut rule_set = self.build_rule_set(root, defaults::default_catalogue());
        for (pattern, origin) in extra.iter() {
            rule_set.insert(pattern, origin.clone());
        }
        let engine = MatchEngine::new(root, &rule_set, max_file_size)?;
        Ok((rule_set, engine))
    }
}

/// Parses a human size such as `1MiB`, `512kb` or `2048`.
pub fn parse_size(size_str: &str) -> Result<u64> {
    let byte_value = Byte::from_str(size_str.trim()).map_err(|e| {
        AppError::SizeParse(format!(
            "Invalid size '{}': {}. Use B, KiB, MiB, KB, MB, etc.",
            size_str, e
        ))
    })?;
    Ok(byte_value.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_limits() {
        let config = Config::default();
        assert!(config.general.use_gitignore);
        assert!(config.general.enable_default_ignores);
        assert_eq!(config.general.max_file_size, None);
        assert_eq!(
            config.max_file_size_bytes().unwrap(),
            defaults::max_file_size_bytes()
        );
        assert!(config.filters.exclude.is_empty());
    }

    #[test]
    fn explicit_size_overrides_catalogue_limit() {
        let mut config = Config::default();
        config.general.max_file_size = Some("2KiB".to_string());
        assert_eq!(config.max_file_size_bytes().unwrap(), 2048);

        let tmp = tempfile::tempdir().unwrap();
        let (_, engine) = Config::default().build_engine(tmp.path()).unwrap();
        assert_eq!(engine.max_file_size(), defaults::max_file_size_bytes());
    }

    #[test]
    fn parses_partial_toml() {
        let config = Config::from_toml_str(
            r#"
[general]
use_gitignore = false
max_file_size = "10KiB"

[filters]
exclude = ["*.csv", "fixtures/"]
"#,
        )
        .unwrap();
        assert!(!config.general.use_gitignore);
        assert!(config.general.enable_default_ignores);
        assert_eq!(config.max_file_size_bytes().unwrap(), 10 * 1024);
        assert_eq!(config.filters.exclude, vec!["*.csv", "fixtures/"]);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = Config::from_toml_str("[general]\nuse_gitignor = true\n").unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn parse_size_accepts_plain_and_suffixed_values() {
        assert_eq!(parse_size("2048").unwrap(), 2048);
        assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
        assert_eq!(parse_size("512 KiB").unwrap(), 524_288);
        assert!(matches!(parse_size("lots"), Err(AppError::SizeParse(_))));
    }

    #[test]
    fn resolves_default_config_location() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::resolve_config_path(tmp.path(), None, false).unwrap(), None);

        let dir = tmp.path().join(DEFAULT_CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DEFAULT_CONFIG_FILENAME), "").unwrap();
        assert_eq!(
            Config::resolve_config_path(tmp.path(), None, false).unwrap(),
            Some(dir.join(DEFAULT_CONFIG_FILENAME))
        );
        assert_eq!(Config::resolve_config_path(tmp.path(), None, true).unwrap(), None);
    }

    #[test]
    fn explicit_config_gets_toml_extension_and_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("custom.toml"), "").unwrap();
        let name = "custom".to_string();
        assert_eq!(
            Config::resolve_config_path(tmp.path(), Some(&name), false).unwrap(),
            Some(tmp.path().join("custom.toml"))
        );
        let missing = "missing.toml".to_string();
        assert!(matches!(
            Config::resolve_config_path(tmp.path(), Some(&missing), false),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn engine_honours_config_toggles_and_extra_rules() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join(".gitignore"), "*.tmp\n").unwrap();
        fs::write(root.join("a.tmp"), "x").unwrap();
        fs::write(root.join("data.csv"), "x").unwrap();
        fs::write(root.join("out.txt"), "x").unwrap();

        let mut config = Config::default();
        config.general.use_gitignore = false;
        config.filters.exclude = vec!["*.csv".to_string()];
        let mut extra = RuleSet::new();
        extra.insert("/out.txt", RuleOrigin::CommandLine);

        let (rules, engine) = config.build_engine_with(root, &extra).unwrap();
        assert!(!rules.contains("*.tmp"));
        assert_eq!(rules.origin_of("*.csv"), Some(&RuleOrigin::Config));
        assert!(!engine.is_excluded(&root.join("a.tmp")));
        assert!(engine.is_excluded(&root.join("data.csv")));
        assert!(engine.is_excluded(&root.join("out.txt")));
    }
}
