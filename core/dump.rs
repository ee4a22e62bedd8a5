use crate::error::Result;
use crate::walker::TreeWalker;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const TREE_HEADER: &str = "Struktura folderu";
pub const CONTENT_HEADER: &str = "Zawartość pliku";
pub const READ_ERROR_HEADER: &str = "Nie można odczytać pliku";
pub const CONTENTS_SEPARATOR: &str = "### ZAWARTOŚĆ PLIKÓW ###";

/// Counts reported back to the caller after a content dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    pub files_written: usize,
    pub files_failed: usize,
}

/// Header line plus every rendered tree line. Stops at the first walk error.
pub fn write_tree_section<W, I>(out: &mut W, root: &Path, lines: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<String>>,
{
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    write!(out, "### {}: {} ###\n\n", TREE_HEADER, root_name)?;

    let mut count = 0;
    for line in lines {
        writeln!(out, "{}", line?)?;
        count += 1;
    }
    log::debug!("Wrote {} tree lines.", count);
    Ok(count)
}

/// Content blocks for `files`, labelled relative to `root`.
pub fn write_contents_section<W: Write>(
    out: &mut W,
    root: &Path,
    files: &[PathBuf],
) -> Result<DumpStats> {
    write_file_blocks(out, files, |path| {
        pathdiff::diff_paths(path, root)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .into_owned()
    })
}

/// Plain concatenation: content blocks labelled by base name, no filtering.
pub fn write_concatenation<W: Write>(out: &mut W, files: &[PathBuf]) -> Result<DumpStats> {
    write_file_blocks(out, files, |path| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    })
}

/// Tree section, separator, then the contents of every included file.
pub fn write_combined<W: Write>(out: &mut W, walker: &TreeWalker<'_>) -> Result<DumpStats> {
    write_tree_section(out, walker.root(), walker.tree_lines())?;
    write!(out, "\n\n{}\n\n", CONTENTS_SEPARATOR)?;
    let files = walker.list_files()?;
    write_contents_section(out, walker.root(), &files)
}

fn write_file_blocks<W, F>(out: &mut W, files: &[PathBuf], label: F) -> Result<DumpStats>
where
    W: Write,
    F: Fn(&Path) -> String,
{
    let mut stats = DumpStats::default();
    for path in files {
        match read_text(path) {
            Ok(content) => {
                writeln!(out, "### {}: {} ###", CONTENT_HEADER, label(path))?;
                out.write_all(content.as_bytes())?;
                out.write_all(b"\n\n")?;
                stats.files_written += 1;
            }
            Err(detail) => {
                log::warn!("Could not read {}: {}", path.display(), detail);
                write!(
                    out,
                    "### {}: {} - {} ###\n\n",
                    READ_ERROR_HEADER,
                    path.display(),
                    detail
                )?;
                stats.files_failed += 1;
            }
        }
    }
    log::debug!(
        "Wrote {} file blocks ({} unreadable).",
        stats.files_written,
        stats.files_failed
    );
    Ok(stats)
}

fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.utf8_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchEngine;
    use crate::rules::RuleSet;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>),
    {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn tree_section_has_header_and_lines() {
        let lines = vec![Ok("├── a".to_string()), Ok("└── b/".to_string())];
        let text = render(|buf| {
            let count = write_tree_section(buf, Path::new("/tmp/proj"), lines).unwrap();
            assert_eq!(count, 2);
        });
        assert_eq!(text, "### Struktura folderu: proj ###\n\n├── a\n└── b/\n");
    }

    #[test]
    fn contents_section_records_unreadable_files_inline() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/ok.txt"), "hello").unwrap();
        fs::write(root.join("bad.txt"), [0xc3, 0x28]).unwrap();
        let missing = root.join("missing.txt");
        let files = vec![root.join("bad.txt"), missing.clone(), root.join("sub/ok.txt")];

        let mut buf = Vec::new();
        let stats = write_contents_section(&mut buf, root, &files).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(stats, DumpStats { files_written: 1, files_failed: 2 });
        assert!(text.starts_with(&format!(
            "### Nie można odczytać pliku: {} - invalid utf-8",
            root.join("bad.txt").display()
        )));
        assert!(text.contains(&format!("### Nie można odczytać pliku: {} - ", missing.display())));
        let ok_label = Path::new("sub").join("ok.txt");
        assert!(text.ends_with(&format!(
            "### Zawartość pliku: {} ###\nhello\n\n",
            ok_label.display()
        )));
    }

    #[test]
    fn read_text_keeps_error_kinds() {
        let tmp = tempfile::tempdir().unwrap();
        let bad = tmp.path().join("bad.bin");
        fs::write(&bad, [0xff, 0xfe]).unwrap();

        let err = read_text(&bad).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let err = read_text(&tmp.path().join("missing.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn concatenation_uses_base_names() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("one.txt");
        let b = tmp.path().join("two.py");
        fs::write(&a, "1").unwrap();
        fs::write(&b, "print(2)").unwrap();

        let mut buf = Vec::new();
        let stats = write_concatenation(&mut buf, &[a, b]).unwrap();
        assert_eq!(stats.files_written, 2);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "### Zawartość pliku: one.txt ###\n1\n\n### Zawartość pliku: two.py ###\nprint(2)\n\n"
        );
    }

    #[test]
    fn combined_output_has_tree_separator_and_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "A").unwrap();
        fs::write(root.join("b.log"), "B").unwrap();
        fs::write(root.join("sub/c.txt"), "C").unwrap();

        let rules: RuleSet = ["*.log"].into_iter().collect();
        let engine = MatchEngine::new(&root, &rules, 1_048_576).unwrap();
        let walker = TreeWalker::new(&root, &engine);

        let mut buf = Vec::new();
        let stats = write_combined(&mut buf, &walker).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let sub_label = Path::new("sub").join("c.txt");

        let expected = format!(
            "### Struktura folderu: proj ###\n\n├── a.txt\n└── sub/\n    └── c.txt\n\
             \n\n### ZAWARTOŚĆ PLIKÓW ###\n\n\
             ### Zawartość pliku: a.txt ###\nA\n\n\
             ### Zawartość pliku: {} ###\nC\n\n",
            sub_label.display()
        );
        assert_eq!(text, expected);
        assert_eq!(stats, DumpStats { files_written: 2, files_failed: 0 });
    }
}
