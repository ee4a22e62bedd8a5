use indexmap::IndexSet;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Fallback size cutoff when the embedded catalogue does not set one.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

#[derive(Debug, Deserialize)]
struct RawCatalogue {
    #[serde(default = "default_max_file_size")]
    max_file_size: u64,
    #[serde(default)]
    patterns: Vec<String>,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

/// The always-ignored patterns plus the size cutoff that ship with the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultPatterns {
    patterns: Vec<String>,
    max_file_size: u64,
}

impl DefaultPatterns {
    pub fn new<I, S>(patterns: I, max_file_size: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: IndexSet<String> = patterns
            .into_iter()
            .map(Into::into)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            patterns: unique.into_iter().collect(),
            max_file_size,
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }
}

static DEFAULT_CATALOGUE: Lazy<DefaultPatterns> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../data/default_ignores.yaml"
    ));
    let raw: RawCatalogue = serde_yml::from_str(yaml_content)
        .expect("Failed to parse embedded data/default_ignores.yaml");
    log::trace!(
        "Loaded {} built-in ignore patterns (max file size {} bytes)",
        raw.patterns.len(),
        raw.max_file_size
    );
    DefaultPatterns::new(raw.patterns, raw.max_file_size)
});

pub fn default_catalogue() -> &'static DefaultPatterns {
    &DEFAULT_CATALOGUE
}

pub fn default_patterns() -> &'static [String] {
    DEFAULT_CATALOGUE.patterns()
}

pub fn max_file_size_bytes() -> u64 {
    DEFAULT_CATALOGUE.max_file_size()
}
