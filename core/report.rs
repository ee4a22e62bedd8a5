use crate::error::Result;
use crate::matcher::MatchEngine;
use crate::rules::{RuleOrigin, RuleSet};
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct RuleEntry {
    pub pattern: String,
    pub origin: RuleOrigin,
}

impl RuleEntry {
    pub fn from_rule_set(rule_set: &RuleSet) -> Vec<RuleEntry> {
        rule_set
            .iter()
            .map(|(pattern, origin)| RuleEntry {
                pattern: pattern.to_string(),
                origin: origin.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct FileListing {
    pub project_root: String,
    pub files: Vec<String>,
}

impl FileListing {
    /// Root-relative, `/`-separated view of an absolute file list.
    pub fn new(project_root: &Path, files: &[PathBuf]) -> Self {
        let files = files
            .iter()
            .map(|path| {
                pathdiff::diff_paths(path, project_root)
                    .unwrap_or_else(|| path.clone())
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();
        Self {
            project_root: project_root.to_string_lossy().into_owned(),
            files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct PathVerdict {
    pub path: String,
    pub excluded: bool,
}

impl PathVerdict {
    pub fn evaluate(engine: &MatchEngine, path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            excluded: engine.is_excluded(path),
        }
    }
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_json<T: Serialize>(data: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(data)?)
    } else {
        Ok(serde_json::to_string(data)?)
    }
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_yaml<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_yml::to_string(data)?)
}
