pub mod config;
pub mod defaults;
pub mod dump;
pub mod error;
pub mod matcher;
pub mod report;
pub mod rules;
pub mod sources;
pub mod walker;

pub use config::{Config, FiltersConfig, GeneralConfig};
pub use defaults::{DefaultPatterns, default_catalogue, default_patterns, max_file_size_bytes};
pub use dump::{
    DumpStats, write_combined, write_concatenation, write_contents_section, write_tree_section,
};
pub use error::{AppError, Result};
pub use matcher::{MatchEngine, Pattern};
pub use report::{FileListing, PathVerdict, RuleEntry};
pub use rules::{PatternAggregator, RuleOrigin, RuleSet, build_rule_set};
pub use sources::{find_gitignore_files, parse_patterns};
pub use walker::{TreeLines, TreeWalker};
