use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use dirscribe_core::{RuleOrigin, RuleSet, report};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::cli_args::FormatOpts;

/// Buffered writer for `path`, or standard output when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create file {}", path.display()))?;
            log::debug!("Writing output to {}", path.display());
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

// Helper for commands that might output structured data or plain text
pub fn print_data_or_text<T: Serialize>(
    data: &T,
    plain_text: Option<String>,
    format_opts: &FormatOpts,
) -> Result<()> {
    let format = format_opts
        .format
        .as_deref()
        .unwrap_or("text")
        .to_lowercase();

    let content = match (format.as_str(), plain_text) {
        ("text", Some(text)) => text,
        ("yaml" | "yml", _) => report::serialize_to_yaml(data)?,
        // Text without a plain rendering falls back to pretty JSON.
        ("text", None) => report::serialize_to_json(data, true)?,
        _ => report::serialize_to_json(data, format_opts.pretty)?,
    };
    write_to_stdout(&content)
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn rules_table(rule_set: &RuleSet) -> String {
    if rule_set.is_empty() {
        return format!("{}", "(No exclusion rules in effect)".yellow());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Green),
        Cell::new("Pattern").fg(Color::Green),
        Cell::new("Origin").fg(Color::Green),
    ]);
    for (index, (pattern, origin)) in rule_set.iter().enumerate() {
        let origin_color = match origin {
            RuleOrigin::Default => Color::Cyan,
            RuleOrigin::Gitignore(_) => Color::Yellow,
            RuleOrigin::Config => Color::Blue,
            RuleOrigin::CommandLine => Color::Magenta,
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(pattern),
            Cell::new(origin.to_string()).fg(origin_color),
        ]);
    }
    format!("{table}\n{} rule(s)", rule_set.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn open_output_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("out.txt");
        {
            let mut out = open_output(Some(&path)).unwrap();
            out.write_all(b"hello").unwrap();
            out.flush().unwrap();
        }
        let mut written = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut written)
            .unwrap();
        assert_eq!(written, "hello");
    }

    #[test]
    fn rules_table_lists_every_pattern() {
        let mut rules = RuleSet::new();
        rules.insert("*.log", RuleOrigin::Default);
        rules.insert("dist/", RuleOrigin::CommandLine);
        let rendered = rules_table(&rules);
        assert!(rendered.contains("*.log"));
        assert!(rendered.contains("dist/"));
        assert!(rendered.ends_with("2 rule(s)"));
    }
}
