use crate::cli_args::CheckArgs;
use crate::output::print_data_or_text;
use crate::{absolutize, prepare_scan};
use anyhow::Result;
use colored::*;
use dirscribe_core::PathVerdict;

pub fn handle_check_command(args: &CheckArgs) -> Result<()> {
    let ctx = prepare_scan(&args.project_config, &args.ignore, None)?;

    let verdicts: Vec<PathVerdict> = args
        .paths
        .iter()
        .map(|path| {
            // Missing paths stay as given and report as excluded.
            let resolved = absolutize(path).unwrap_or_else(|| path.clone());
            log::debug!("Evaluating {}", resolved.display());
            PathVerdict::evaluate(&ctx.engine, &resolved)
        })
        .collect();

    let plain = verdicts
        .iter()
        .map(|v| {
            let label = if v.excluded {
                "excluded".red()
            } else {
                "included".green()
            };
            format!("{:<9} {}", label, v.path)
        })
        .collect::<Vec<_>>()
        .join("\n");
    print_data_or_text(&verdicts, Some(plain), &args.format)
}
