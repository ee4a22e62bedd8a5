use crate::error::{AppError, Result};
use crate::matcher::MatchEngine;
use std::ffi::OsString;
use std::fs;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::vec;
use walkdir::WalkDir;

pub const BRANCH_CONNECTOR: &str = "├── ";
pub const LAST_CONNECTOR: &str = "└── ";
pub const INDENT: &str = "    ";

/// Traverses a root directory, consulting a [`MatchEngine`] at every node.
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    root: &'a Path,
    engine: &'a MatchEngine,
}

#[derive(Debug)]
struct TreeEntry {
    name: OsString,
    path: PathBuf,
    is_dir: bool,
}

impl<'a> TreeWalker<'a> {
    pub fn new(root: &'a Path, engine: &'a MatchEngine) -> Self {
        Self { root, engine }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    /// Rendered tree lines, produced lazily. Each call starts a fresh walk.
    pub fn tree_lines(&self) -> TreeLines<'a> {
        TreeLines {
            walker: *self,
            stack: Vec::new(),
            pending: Some((self.root.to_path_buf(), 0)),
        }
    }

    /// Absolute paths of every included regular file, in file-name order.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        log::debug!("Listing included files under: {}", self.root.display());
        let engine = self.engine;
        let walker = WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !entry.file_type().is_dir() || !engine.is_excluded(entry.path())
            });

        let mut files = Vec::new();
        for entry_result in walker {
            let entry = entry_result?;
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }
            if engine.is_excluded(entry.path()) {
                log::trace!("Excluding file: {}", entry.path().display());
                continue;
            }
            files.push(entry.into_path());
        }
        log::info!("Found {} included files.", files.len());
        Ok(files)
    }

    fn read_children(&self, dir: &Path) -> Result<Vec<TreeEntry>> {
        let read_dir = fs::read_dir(dir).map_err(|e| AppError::DirRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut children = Vec::new();
        for entry_result in read_dir {
            let entry = entry_result.map_err(|e| AppError::DirRead {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if self.engine.is_excluded(&path) {
                log::trace!("Pruning from tree: {}", path.display());
                continue;
            }
            let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
            children.push(TreeEntry {
                name: entry.file_name(),
                path,
                is_dir,
            });
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }
}

struct Level {
    entries: Peekable<vec::IntoIter<TreeEntry>>,
    depth: usize,
}

/// Iterator over rendered tree lines. Stops after the first error.
pub struct TreeLines<'a> {
    walker: TreeWalker<'a>,
    stack: Vec<Level>,
    pending: Option<(PathBuf, usize)>,
}

impl Iterator for TreeLines<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((dir, depth)) = self.pending.take() {
            match self.walker.read_children(&dir) {
                Ok(children) => self.stack.push(Level {
                    entries: children.into_iter().peekable(),
                    depth,
                }),
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }

        loop {
            let level = self.stack.last_mut()?;
            let Some(entry) = level.entries.next() else {
                self.stack.pop();
                continue;
            };
            let is_last = level.entries.peek().is_none();
            let line = format_tree_line(level.depth, is_last, &entry.name.to_string_lossy(), entry.is_dir);
            if entry.is_dir {
                self.pending = Some((entry.path, level.depth + 1));
            }
            return Some(Ok(line));
        }
    }
}

pub fn format_tree_line(depth: usize, is_last: bool, name: &str, is_dir: bool) -> String {
    let connector = if is_last { LAST_CONNECTOR } else { BRANCH_CONNECTOR };
    let suffix = if is_dir { "/" } else { "" };
    format!("{}{}{}{}", INDENT.repeat(depth), connector, name, suffix)
}
