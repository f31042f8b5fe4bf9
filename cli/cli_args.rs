use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use xexport_core::ResolutionPolicy;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        short = 'c',
        long,
        help = "Specify path/filename of the JSON config file (default: ./config.json).",
        value_name = "CONFIG_FILE",
        help_heading = "Project Setup"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(
    name = "xexport",
    author,
    version,
    about = "Export project trees and selected file contents into one text file.",
    long_about = "xexport walks the configured project directories, renders their structure \nas an indented tree and appends the full contents of the requested files, \nproducing a single shareable snapshot.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  xexport\n  xexport export -c ./config.json -o snapshot.txt\n  xexport tree --ignore target --ignore .git\n  xexport config > config.json"
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
        visible_alias = "e",
        about = "Render the project trees and export the configured files [default]."
    )]
    Export(ExportArgs),

    #[command(visible_alias = "t", about = "Print only the rendered project trees.")]
    Tree(TreeArgs),

    #[command(about = "Show or save a sample configuration file.")]
    Config(ConfigArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "OUTPUT_FILE",
        help = "Write the export to this file (overrides 'output_file').",
        help_heading = "Output Control",
        conflicts_with = "stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Print the export to standard output instead of writing a file.",
        help_heading = "Output Control"
    )]
    pub stdout: bool,

    #[arg(
        short = 'r',
        long,
        value_name = "POLICY",
        help = "How file references are resolved: name_prefix or path_containment (overrides 'resolution').",
        help_heading = "Resolution"
    )]
    pub resolution: Option<ResolutionPolicy>,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        long = "ignore",
        value_name = "DIR_NAME",
        action = clap::ArgAction::Append,
        help = "Directory name to skip; replaces 'ignored_dirs' when given.",
        help_heading = "Content Filtering"
    )]
    pub ignore: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to default location (refuses to overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        help = "Save the sample config (default: ./config.json); refuses to overwrite."
    )]
    pub save: Option<Option<PathBuf>>,
}
