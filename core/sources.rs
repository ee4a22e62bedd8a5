use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const GITIGNORE_FILENAME: &str = ".gitignore";

/// Every `.gitignore` below `root`, in path order.
///
/// This walk deliberately ignores the exclusion rules: it is where the rules
/// come from. Entries that cannot be read are logged and skipped.
pub fn find_gitignore_files(root: &Path) -> Vec<PathBuf> {
    log::debug!("Searching for {} files in: {}", GITIGNORE_FILENAME, root.display());
    let mut found = Vec::new();
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

    for entry_result in walker {
        match entry_result {
            Ok(entry) => {
                if entry.file_type().is_file() && entry.file_name() == GITIGNORE_FILENAME {
                    log::trace!("Found ignore file: {}", entry.path().display());
                    found.push(entry.into_path());
                }
            }
            Err(e) => {
                log::warn!(
                    "Error accessing path while collecting ignore files: {} (at {})",
                    e,
                    e.path()
                        .map_or_else(|| "unknown path".into(), |p| p.display().to_string())
                );
            }
        }
    }
    log::debug!("Found {} ignore files.", found.len());
    found
}

/// Pattern lines of a single ignore file.
///
/// A file that cannot be read or decoded contributes no patterns.
pub fn parse_patterns(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => parse_pattern_lines(&content),
        Err(e) => {
            log::warn!("Failed to read ignore file '{}': {}", path.display(), e);
            Vec::new()
        }
    }
}

pub fn parse_pattern_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| {
            if line.starts_with('!') {
                log::debug!("Skipping unsupported negation pattern: {}", line);
                false
            } else {
                true
            }
        })
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_blanks_and_negations() {
        let content = r#"
# build output
target/

  *.log
!keep.log
# another comment
/secret.txt
"#;
        assert_eq!(
            parse_pattern_lines(content),
            vec!["target/", "*.log", "/secret.txt"]
        );
    }

    #[test]
    fn parse_handles_crlf_line_endings() {
        assert_eq!(parse_pattern_lines("a.txt\r\nb/\r\n"), vec!["a.txt", "b/"]);
    }

    #[test]
    fn missing_file_yields_no_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(parse_patterns(&tmp.path().join("nope/.gitignore")).is_empty());
    }

    #[test]
    fn non_utf8_file_yields_no_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(GITIGNORE_FILENAME);
        fs::write(&path, [0xff, 0xfe, b'\n', b'*']).unwrap();
        assert!(parse_patterns(&path).is_empty());
    }

    #[test]
    fn finds_nested_ignore_files_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("c")).unwrap();
        fs::write(root.join(".gitignore"), "*.tmp\n").unwrap();
        fs::write(root.join("a/b/.gitignore"), "*.bak\n").unwrap();
        fs::write(root.join("c/not-an-ignore.txt"), "x").unwrap();
        // A directory with the same name is not an ignore file.
        fs::create_dir_all(root.join("c/.gitignore")).unwrap();

        let found = find_gitignore_files(root);
        assert_eq!(
            found,
            vec![root.join(".gitignore"), root.join("a/b/.gitignore")]
        );
    }
}
