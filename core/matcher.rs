use crate::error::Result;
use crate::rules::RuleSet;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One parsed exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    body: String,
    dir_only: bool,
    anchored: bool,
}

impl Pattern {
    /// Parses a single rule line. Blank lines, comments, negations and rules
    /// with nothing left after stripping slashes yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        if trimmed.starts_with('!') {
            log::warn!("Negation pattern '{}' is not supported and has no effect.", trimmed);
            return None;
        }

        let dir_only = trimmed.ends_with('/');
        let without_trailing = trimmed.trim_end_matches('/');
        let anchored = without_trailing.starts_with('/');
        let body = without_trailing.trim_start_matches('/');
        if body.is_empty() {
            log::debug!("Ignoring pattern without a name component: '{}'", trimmed);
            return None;
        }

        Some(Self {
            raw: trimmed.to_string(),
            body: body.to_string(),
            dir_only,
            anchored,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Anchored rule matching exactly one root-relative path, with glob
    /// metacharacters escaped.
    ///
    /// Trailing whitespace is wrapped in character classes so that rule
    /// trimming cannot strip it.
    pub fn exact_path_rule(relative: &Path) -> String {
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let escaped = globset::escape(&joined);
        let kept = escaped.trim_end();
        let mut rule = format!("/{}", kept);
        for c in escaped[kept.len()..].chars() {
            rule.push('[');
            rule.push(c);
            rule.push(']');
        }
        rule
    }

    /// Glob evaluated against root-relative, `/`-separated paths.
    pub fn glob(&self) -> String {
        if self.anchored || self.body == "**" || self.body.starts_with("**/") {
            self.body.clone()
        } else {
            format!("**/{}", self.body)
        }
    }
}

/// Compiled rule set answering "is this path excluded?" for one root.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    root: PathBuf,
    any_kind: GlobSet,
    dir_only: GlobSet,
    max_file_size: u64,
    rule_count: usize,
}

impl MatchEngine {
    pub fn new(root: impl Into<PathBuf>, rule_set: &RuleSet, max_file_size: u64) -> Result<Self> {
        let root = root.into();
        log::trace!("Compiling {} rules for {}", rule_set.len(), root.display());

        let mut any_kind = GlobSetBuilder::new();
        let mut dir_only = GlobSetBuilder::new();
        let mut rule_count = 0;

        for raw in rule_set.patterns() {
            let Some(pattern) = Pattern::parse(raw) else {
                continue;
            };
            let glob_str = pattern.glob();
            match GlobBuilder::new(&glob_str).literal_separator(true).build() {
                Ok(glob) => {
                    log::trace!(
                        "Adding rule {} (glob {}, dir only: {})",
                        pattern.raw(),
                        glob_str,
                        pattern.is_dir_only()
                    );
                    if pattern.is_dir_only() {
                        dir_only.add(glob);
                    } else {
                        any_kind.add(glob);
                    }
                    rule_count += 1;
                }
                Err(e) => {
                    log::warn!("Skipping invalid pattern \"{}\": {}", raw, e);
                }
            }
        }

        Ok(Self {
            root,
            any_kind: any_kind.build()?,
            dir_only: dir_only.build()?,
            max_file_size,
            rule_count,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Number of rules that compiled successfully.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Full verdict for a path on disk: size cutoff first, then patterns.
    ///
    /// Paths outside the root, or that cannot be inspected, are excluded.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let Some(relative) = self.relative_path(path) else {
            log::debug!(
                "Excluding path outside of root {}: {}",
                self.root.display(),
                path.display()
            );
            return true;
        };

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::debug!("Excluding path that cannot be inspected: {} ({})", path.display(), e);
                return true;
            }
        };

        if metadata.is_file() && metadata.len() > self.max_file_size {
            log::trace!(
                "Excluding {} ({} bytes exceeds {} bytes)",
                relative,
                metadata.len(),
                self.max_file_size
            );
            return true;
        }

        self.matches_relative(&relative, metadata.is_dir())
    }

    /// Pattern-only verdict for a root-relative path. A path is also matched
    /// when any of its ancestor directories is.
    pub fn matches_relative(&self, relative: &str, is_dir: bool) -> bool {
        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            return false;
        }

        for (idx, _) in relative.match_indices('/') {
            let ancestor = &relative[..idx];
            if self.matches_entry(ancestor, true) {
                log::trace!("Excluding {} (ancestor {} matched)", relative, ancestor);
                return true;
            }
        }

        let matched = self.matches_entry(relative, is_dir);
        if matched {
            log::trace!("Excluding {} (pattern matched)", relative);
        }
        matched
    }

    fn matches_entry(&self, relative: &str, is_dir: bool) -> bool {
        self.any_kind.is_match(relative) || (is_dir && self.dir_only.is_match(relative))
    }

    /// Root-relative path with `/` separators, or `None` when `path` is not
    /// below the root.
    fn relative_path(&self, path: &Path) -> Option<String> {
        let stripped = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(name) => parts.push(name.to_string_lossy()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(parts.join("/"))
    }
}
