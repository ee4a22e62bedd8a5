use crate::cli_args::ConcatArgs;
use crate::output::open_output;
use anyhow::{Context, Result};
use colored::*;
use dirscribe_core::dump;
use std::io::Write;

pub fn handle_concat_command(args: &ConcatArgs, quiet: bool) -> Result<()> {
    let output_path = args.output.output.as_deref();
    log::info!("Concatenating {} file(s).", args.files.len());

    let mut out = open_output(output_path)?;
    let stats = dump::write_concatenation(&mut out, &args.files)
        .context("Failed to write concatenated output")?;
    out.flush().context("Failed to flush output")?;

    if let Some(path) = output_path {
        if !quiet {
            eprintln!(
                "{} Concatenated {} file(s) into {}",
                "✅".green(),
                stats.files_written.to_string().cyan(),
                path.display().to_string().blue()
            );
        }
    }
    if stats.files_failed > 0 {
        log::warn!("{} file(s) could not be read.", stats.files_failed);
    }
    Ok(())
}
