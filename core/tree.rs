use crate::project::ProjectRoot;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use walkdir::{DirEntry, WalkDir};

/// Directory names skipped when the configuration does not name its own set.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "bin",
    "obj",
    "node_modules",
    "venv",
    ".idea",
    ".vscode",
    ".vs",
    "dist",
    "target",
    ".gradle",
    ".next",
    "build",
    "__pycache__",
    "coverage",
    ".cache",
    ".pytest_cache",
    ".parcel-cache",
    ".nuget",
    "logs",
    "lib",
    "tmp",
    "docker",
    ".sass-cache",
    "public",
    "vendor",
    ".DS_Store",
    "Thumbs.db",
];

const INDENT_WIDTH: usize = 4;

/// Exact, case-sensitive directory base names excluded from the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet(HashSet<String>);

impl IgnoreSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_IGNORED_DIRS.iter().copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One rendered line of the projects section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Header { project: String },
    NotFound { project: String },
    Dir { name: String, depth: usize },
    File { name: String, depth: usize },
    Separator,
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeEntry::Header { project } => writeln!(f, "• Project structure of {}:", project),
            TreeEntry::NotFound { project } => writeln!(f, "• Directory {} not found.", project),
            TreeEntry::Dir { name, depth } => {
                write!(f, "{:width$}{}/", "", name, width = INDENT_WIDTH * depth)
            }
            TreeEntry::File { name, depth } => {
                write!(f, "{:width$}{}", "", name, width = INDENT_WIDTH * depth)
            }
            TreeEntry::Separator => Ok(()),
        }
    }
}

/// Renders the projects section: one block per root, in the given order.
pub fn render_tree(roots: &[ProjectRoot], ignore: &IgnoreSet) -> String {
    collect_entries(roots, ignore)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn collect_entries(roots: &[ProjectRoot], ignore: &IgnoreSet) -> Vec<TreeEntry> {
    log::debug!(
        "Rendering tree for {} project(s), ignoring {} directory name(s)",
        roots.len(),
        ignore.len()
    );
    let mut entries = Vec::new();
    for root in roots {
        if !root.exists() {
            log::warn!("Project directory not found: {}", root.path().display());
            entries.push(TreeEntry::NotFound {
                project: root.name().to_string(),
            });
            continue;
        }

        entries.push(TreeEntry::Header {
            project: root.name().to_string(),
        });
        walk_root(root, ignore, &mut entries);
        entries.push(TreeEntry::Separator);
    }
    log::debug!("Tree rendering produced {} entries", entries.len());
    entries
}

// Walkdir yields a directory before its children. Sorting files ahead of
// subdirectories keeps every file line directly under its directory line.
fn walk_root(root: &ProjectRoot, ignore: &IgnoreSet, entries: &mut Vec<TreeEntry>) {
    log::info!("Walking project directory: {}", root.path().display());
    let walker = WalkDir::new(root.path())
        .follow_links(false)
        .sort_by(files_before_dirs)
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry, ignore));

    for entry_result in walker {
        match entry_result {
            Ok(entry) => {
                let depth = entry.depth();
                if is_dir_like(&entry) {
                    let name = if depth == 0 {
                        root.name().to_string()
                    } else {
                        entry_name(&entry)
                    };
                    log::trace!("Dir: {}", entry.path().display());
                    entries.push(TreeEntry::Dir { name, depth });
                } else {
                    log::trace!("File: {}", entry.path().display());
                    entries.push(TreeEntry::File {
                        name: entry_name(&entry),
                        depth,
                    });
                }
            }
            Err(e) => {
                log::warn!(
                    "Error walking directory: {} (at {})",
                    e,
                    e.path()
                        .map_or_else(|| "unknown path".into(), |p| p.display().to_string())
                );
            }
        }
    }
}

fn is_ignored_dir(entry: &DirEntry, ignore: &IgnoreSet) -> bool {
    // The root was requested explicitly and is never pruned.
    if entry.depth() == 0 || !is_dir_like(entry) {
        return false;
    }
    let ignored = entry
        .file_name()
        .to_str()
        .is_some_and(|name| ignore.contains(name));
    if ignored {
        log::trace!("Pruning ignored directory: {}", entry.path().display());
    }
    ignored
}

// Links are not followed, so a linked directory is listed as a directory
// but never descended into.
fn is_dir_like(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    is_dir_like(a)
        .cmp(&is_dir_like(b))
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}
