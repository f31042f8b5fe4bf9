pub mod config;
pub mod error;
pub mod export;
pub mod project;
pub mod resolve;
pub mod tree;

pub use config::{Config, DEFAULT_CONFIG_FILENAME, DEFAULT_OUTPUT_FILENAME};
pub use error::{AppError, Result};
pub use export::{
    ExportRecord, RecordBody, assemble_document, build_export_document, export_files,
    render_records,
};
pub use project::ProjectRoot;
pub use resolve::{ResolutionPolicy, ResolvedFile, normalize_path, resolve_reference};
pub use tree::{DEFAULT_IGNORED_DIRS, IgnoreSet, TreeEntry, collect_entries, render_tree};
