use crate::cli_args::ScanArgs;
use crate::output::open_output;
use crate::prepare_scan;
use anyhow::{Context, Result};
use colored::*;
use dirscribe_core::{DumpStats, TreeWalker, dump};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Tree,
    Contents,
    Full,
}

pub fn handle_scan_command(args: &ScanArgs, mode: ScanMode, quiet: bool) -> Result<()> {
    let output_path = args.output.output.as_deref();
    // Root and rules are resolved before the output file is created.
    let ctx = prepare_scan(&args.project_config, &args.ignore, output_path)?;
    let walker = TreeWalker::new(&ctx.project_root, &ctx.engine);

    let mut out = open_output(output_path)?;
    let summary = match mode {
        ScanMode::Tree => {
            let lines = dump::write_tree_section(&mut out, walker.root(), walker.tree_lines())
                .context("Failed to render directory tree")?;
            format!("{} tree entries", lines.to_string().cyan())
        }
        ScanMode::Contents => {
            let files = walker.list_files().context("Failed to list files")?;
            let stats = dump::write_contents_section(&mut out, walker.root(), &files)
                .context("Failed to dump file contents")?;
            describe_stats(&stats)
        }
        ScanMode::Full => {
            let stats =
                dump::write_combined(&mut out, &walker).context("Failed to write full dump")?;
            describe_stats(&stats)
        }
    };
    out.flush().context("Failed to flush output")?;

    if let Some(path) = output_path {
        if !quiet {
            eprintln!(
                "{} Wrote {} to {}",
                "✅".green(),
                summary,
                path.display().to_string().blue()
            );
        }
    }
    Ok(())
}

fn describe_stats(stats: &DumpStats) -> String {
    let mut summary = format!("{} file(s)", stats.files_written.to_string().cyan());
    if stats.files_failed > 0 {
        summary.push_str(&format!(
            " ({} unreadable)",
            stats.files_failed.to_string().yellow()
        ));
    }
    summary
}
