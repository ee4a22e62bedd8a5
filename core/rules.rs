use crate::defaults::{self, DefaultPatterns};
use crate::sources;
use indexmap::IndexMap;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a pattern in a [`RuleSet`] first came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(tag = "kind", content = "path", rename_all = "snake_case"))]
pub enum RuleOrigin {
    Default,
    Gitignore(PathBuf),
    Config,
    CommandLine,
}

impl fmt::Display for RuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOrigin::Default => write!(f, "default"),
            RuleOrigin::Gitignore(path) => write!(f, "gitignore:{}", path.display()),
            RuleOrigin::Config => write!(f, "config"),
            RuleOrigin::CommandLine => write!(f, "command-line"),
        }
    }
}

/// Ordered, de-duplicated exclusion patterns.
///
/// Order only matters for display; matching is a disjunction over all rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: IndexMap<String, RuleOrigin>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern, keeping the origin of its first occurrence.
    /// Returns `false` for blank or already known patterns.
    pub fn insert(&mut self, pattern: impl Into<String>, origin: RuleOrigin) -> bool {
        let pattern = pattern.into().trim().to_string();
        if pattern.is_empty() || self.rules.contains_key(&pattern) {
            return false;
        }
        self.rules.insert(pattern, origin);
        true
    }

    pub fn extend_from<I, S>(&mut self, patterns: I, origin: RuleOrigin) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        patterns
            .into_iter()
            .map(|p| self.insert(p, origin.clone()))
            .filter(|added| *added)
            .count()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.rules.contains_key(pattern)
    }

    pub fn origin_of(&self, pattern: &str) -> Option<&RuleOrigin> {
        self.rules.get(pattern)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleOrigin)> {
        self.rules.iter().map(|(p, o)| (p.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        set.extend_from(iter, RuleOrigin::CommandLine);
        set
    }
}

/// Merges the built-in catalogue, discovered `.gitignore` files and extra
/// patterns into a single [`RuleSet`] for one scan.
#[derive(Debug, Clone)]
pub struct PatternAggregator<'a> {
    defaults: &'a DefaultPatterns,
    include_defaults: bool,
    use_gitignore: bool,
    extra: Vec<(String, RuleOrigin)>,
}

impl<'a> PatternAggregator<'a> {
    pub fn new(defaults: &'a DefaultPatterns) -> Self {
        Self {
            defaults,
            include_defaults: true,
            use_gitignore: true,
            extra: Vec::new(),
        }
    }

    pub fn include_defaults(mut self, enabled: bool) -> Self {
        self.include_defaults = enabled;
        self
    }

    pub fn use_gitignore(mut self, enabled: bool) -> Self {
        self.use_gitignore = enabled;
        self
    }

    pub fn extra_patterns<I, S>(mut self, patterns: I, origin: RuleOrigin) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra
            .extend(patterns.into_iter().map(|p| (p.into(), origin.clone())));
        self
    }

    pub fn build_rule_set(&self, root: &Path) -> RuleSet {
        log::debug!("Building rule set for: {}", root.display());
        let mut rule_set = RuleSet::new();

        if self.include_defaults {
            let added = rule_set.extend_from(self.defaults.patterns(), RuleOrigin::Default);
            log::trace!("Added {} default patterns.", added);
        } else {
            log::debug!("Built-in ignore patterns disabled.");
        }

        if self.use_gitignore {
            for ignore_file in sources::find_gitignore_files(root) {
                let patterns = sources::parse_patterns(&ignore_file);
                let origin_path = pathdiff::diff_paths(&ignore_file, root)
                    .unwrap_or_else(|| ignore_file.clone());
                let added =
                    rule_set.extend_from(patterns, RuleOrigin::Gitignore(origin_path));
                log::trace!(
                    "Merged {} new patterns from {}",
                    added,
                    ignore_file.display()
                );
            }
        } else {
            log::debug!(".gitignore discovery disabled.");
        }

        for (pattern, origin) in &self.extra {
            rule_set.insert(pattern.as_str(), origin.clone());
        }

        log::info!("Rule set contains {} patterns.", rule_set.len());
        rule_set
    }
}

/// Default catalogue plus every `.gitignore` found under `root`.
pub fn build_rule_set(root: &Path) -> RuleSet {
    PatternAggregator::new(defaults::default_catalogue()).build_rule_set(root)
}
