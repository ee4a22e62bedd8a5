use crate::cli_args::FilesArgs;
use crate::output::print_data_or_text;
use crate::prepare_scan;
use anyhow::{Context, Result};
use dirscribe_core::{FileListing, TreeWalker};

pub fn handle_files_command(args: &FilesArgs) -> Result<()> {
    let ctx = prepare_scan(&args.project_config, &args.ignore, None)?;
    let files = TreeWalker::new(&ctx.project_root, &ctx.engine)
        .list_files()
        .context("Failed to list files")?;
    log::info!("{} file(s) pass the filters.", files.len());

    let listing = FileListing::new(&ctx.project_root, &files);
    let plain = listing.files.join("\n");
    print_data_or_text(&listing, Some(plain), &args.format)
}
