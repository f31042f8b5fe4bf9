use std::fs;
use std::path::{Path, PathBuf};

/// A directory that bounds both the tree walk and file resolution.
///
/// The base name is computed once and used for headers, tree labels and
/// name-prefix matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    path: PathBuf,
    name: String,
}

impl ProjectRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = base_name(&path);
        log::trace!("Project root '{}' named '{}'", path.display(), name);
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Only existing directories are traversable.
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }
}

// `Path::file_name` is None for `.`, `..` and `/`; fall back to the canonical form.
fn base_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    match fs::canonicalize(path) {
        Ok(canonical) => canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| canonical.display().to_string()),
        Err(_) => path.display().to_string(),
    }
}
