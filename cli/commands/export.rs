use crate::cli_args::ExportArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use xexport_core::{self as core, Config};

pub fn handle_export_command(args: ExportArgs, quiet: bool) -> Result<()> {
    let config = load_config_for_command(&args.project_config)?;
    let config = apply_cli_overrides(config, &args)?;

    log::info!(
        "Exporting {} project(s) and {} file(s) with policy {}",
        config.projects.len(),
        config.files.len(),
        config.resolution
    );

    // The whole document is built before anything is written, so a fatal
    // resolution error never leaves a partial output file.
    let document =
        core::build_export_document(&config).context("Failed to build the export document")?;

    if args.stdout {
        return output::write_to_stdout(&document);
    }

    output::write_to_file(&config.output_file, &document)?;
    if !quiet {
        println!(
            "{} Export complete! File saved as {}",
            "✅".green(),
            config.output_file.display().to_string().blue()
        );
    }
    Ok(())
}

fn apply_cli_overrides(mut config: Config, args: &ExportArgs) -> Result<Config> {
    log::trace!("Applying export command CLI overrides to config...");
    if let Some(output) = &args.output {
        config.output_file = output.clone();
    }
    if let Some(policy) = args.resolution {
        config.resolution = policy;
        // Switching policy can change which keys are required.
        config
            .validate()
            .context("Configuration is invalid for the requested resolution policy")?;
    }
    log::trace!("Config after CLI overrides: {:?}", config);
    Ok(config)
}
