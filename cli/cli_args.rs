use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the directory to scan (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .dirscribe/dirscribe.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub no_config_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IgnoreOpts {
    #[arg(
        long,
        help = "Merge patterns from every .gitignore under the root [default: enabled].",
        overrides_with = "disable_gitignore",
        help_heading = "Ignore Rules"
    )]
    pub enable_gitignore: bool,
    #[arg(
        long,
        help = "Do not read .gitignore files.",
        overrides_with = "enable_gitignore",
        help_heading = "Ignore Rules"
    )]
    pub disable_gitignore: bool,

    #[arg(
        long,
        help = "Apply built-in ignores (e.g., .git/, target/, *.zip) [default: enabled].",
        overrides_with = "disable_default_ignores",
        help_heading = "Ignore Rules"
    )]
    pub enable_default_ignores: bool,
    #[arg(
        long,
        help = "Disable built-in ignores.",
        overrides_with = "enable_default_ignores",
        help_heading = "Ignore Rules"
    )]
    pub disable_default_ignores: bool,

    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add an exclusion pattern (gitignore syntax).", help_heading = "Ignore Rules")]
    pub exclude: Vec<String>,

    #[arg(
        long,
        value_name = "SIZE",
        help = "Skip files larger than SIZE (e.g., '1MiB', '500KB') [default: 1MiB].",
        help_heading = "Ignore Rules"
    )]
    pub max_file_size: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputOpts {
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the result to FILE instead of standard output.",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOpts {
    #[arg(short = 'f', long, help = "Set the output format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml"], help_heading = "Output Formatting")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Pretty-print JSON output.",
        help_heading = "Output Formatting"
    )]
    pub pretty: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render directory trees and dump file contents, filtered by gitignore-style rules.",
    long_about = "dirscribe writes an indented directory tree and/or the contents of the files \nunder a folder into a single text file. Paths are filtered by built-in ignores, \nevery .gitignore found under the folder, extra patterns and a file size limit.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  dirscribe tree -o structure.txt\n  dirscribe full --project-root ~/code/app -o app.txt\n  dirscribe concat notes.txt main.py -o merged.txt\n  dirscribe rules",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "c",
        about = "Concatenate the given files into one output, with a header per file."
    )]
    Concat(ConcatArgs),

    #[command(visible_alias = "t", about = "Render the filtered directory tree.")]
    Tree(ScanArgs),

    #[command(about = "Dump the contents of every included file.")]
    Contents(ScanArgs),

    #[command(about = "Render the tree followed by the contents of every included file.")]
    Full(ScanArgs),

    #[command(visible_alias = "ls", about = "List the files that would be dumped.")]
    Files(FilesArgs),

    #[command(about = "Show the effective exclusion rules and where they come from.")]
    Rules(RulesArgs),

    #[command(about = "Report whether specific paths are excluded.")]
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConcatArgs {
    #[arg(required = true, value_name = "FILE", help = "Files to concatenate, in order.")]
    pub files: Vec<PathBuf>,

    #[clap(flatten)]
    pub output: OutputOpts,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub ignore: IgnoreOpts,
    #[clap(flatten)]
    pub output: OutputOpts,
}

#[derive(Args, Debug, Clone)]
pub struct FilesArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub ignore: IgnoreOpts,
    #[clap(flatten)]
    pub format: FormatOpts,
}

#[derive(Args, Debug, Clone)]
pub struct RulesArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub ignore: IgnoreOpts,
    #[clap(flatten)]
    pub format: FormatOpts,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub ignore: IgnoreOpts,
    #[clap(flatten)]
    pub format: FormatOpts,
    #[arg(required = true, value_name = "PATH", help = "Paths to evaluate (relative to the current dir).")]
    pub paths: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scan_flags() {
        let cli = Cli::parse_from([
            "dirscribe",
            "full",
            "--project-root",
            "/tmp/x",
            "-e",
            "*.csv",
            "--exclude",
            "fixtures/",
            "--disable-gitignore",
            "--max-file-size",
            "2MiB",
            "-o",
            "out.txt",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Some(Commands::Full(args)) = cli.command else {
            panic!("expected full command");
        };
        assert_eq!(args.project_config.project_root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(args.ignore.exclude, vec!["*.csv", "fixtures/"]);
        assert!(args.ignore.disable_gitignore);
        assert_eq!(args.ignore.max_file_size.as_deref(), Some("2MiB"));
        assert_eq!(args.output.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn concat_requires_files() {
        assert!(Cli::try_parse_from(["dirscribe", "concat"]).is_err());
    }
}
