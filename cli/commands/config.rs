use crate::cli_args::ConfigArgs;
use crate::output;
use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;
use xexport_core::{AppError, Config, DEFAULT_CONFIG_FILENAME};

pub fn handle_config_command(args: &ConfigArgs, quiet: bool) -> Result<()> {
    let sample = Config::sample()
        .to_pretty_json()
        .context("Failed to serialize sample configuration")?;

    let Some(save_target) = &args.save else {
        return output::write_to_stdout(&sample);
    };

    let save_path = save_target
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    if save_path.exists() {
        anyhow::bail!(AppError::Config(format!(
            "Refusing to overwrite existing file '{}'",
            save_path.display()
        )));
    }

    output::write_to_file(&save_path, &format!("{}\n", sample))?;
    if !quiet {
        println!(
            "{} Sample configuration saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}
