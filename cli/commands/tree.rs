use crate::cli_args::TreeArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::Result;
use xexport_core::{self as core, IgnoreSet};

pub fn handle_tree_command(args: TreeArgs) -> Result<()> {
    let config = load_config_for_command(&args.project_config)?;

    let ignore = if args.ignore.is_empty() {
        config.ignore_set()
    } else {
        log::debug!("Using ignore list from command line: {:?}", args.ignore);
        IgnoreSet::new(args.ignore.iter().cloned())
    };

    let tree = core::render_tree(&config.project_roots(), &ignore);
    output::write_to_stdout(&tree)
}
