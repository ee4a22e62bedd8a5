use crate::cli_args::RulesArgs;
use crate::output::{print_data_or_text, rules_table};
use crate::prepare_scan;
use anyhow::Result;
use dirscribe_core::RuleEntry;

pub fn handle_rules_command(args: &RulesArgs) -> Result<()> {
    let ctx = prepare_scan(&args.project_config, &args.ignore, None)?;
    let entries = RuleEntry::from_rule_set(&ctx.rule_set);
    print_data_or_text(&entries, Some(rules_table(&ctx.rule_set)), &args.format)
}
