use crate::error::{AppError, Result};
use crate::project::ProjectRoot;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// How a requested file reference is mapped onto a project root.
///
/// The two policies differ in how an unresolvable reference is treated:
/// `NamePrefix` records it inline and carries on, `PathContainment` aborts
/// the whole export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// `"<project name>/<relative path>"`, matched on the leading segment.
    #[default]
    NamePrefix,
    /// A real filesystem path that must lie under one of the roots.
    PathContainment,
}

impl ResolutionPolicy {
    pub fn aborts_on_unresolved(self) -> bool {
        matches!(self, ResolutionPolicy::PathContainment)
    }

    /// Whether the configuration must list at least one file.
    pub fn requires_files(self) -> bool {
        matches!(self, ResolutionPolicy::PathContainment)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionPolicy::NamePrefix => "name_prefix",
            ResolutionPolicy::PathContainment => "path_containment",
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "name_prefix" => Ok(ResolutionPolicy::NamePrefix),
            "path_containment" => Ok(ResolutionPolicy::PathContainment),
            other => Err(AppError::Config(format!(
                "Unknown resolution policy '{}' (expected 'name_prefix' or 'path_containment')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    /// Project-relative display label, `<project>/<path>`.
    pub label: String,
    pub project: String,
}

pub fn resolve_reference(
    reference: &str,
    roots: &[ProjectRoot],
    policy: ResolutionPolicy,
) -> Result<ResolvedFile> {
    log::trace!("Resolving '{}' with policy {}", reference, policy);
    match policy {
        ResolutionPolicy::NamePrefix => resolve_by_name_prefix(reference, roots),
        ResolutionPolicy::PathContainment => resolve_by_containment(reference, roots),
    }
}

fn resolve_by_name_prefix(reference: &str, roots: &[ProjectRoot]) -> Result<ResolvedFile> {
    let not_found = || AppError::NotFound {
        reference: reference.to_string(),
    };

    let reference_path = Path::new(reference);
    let reference_path = reference_path.strip_prefix(".").unwrap_or(reference_path);
    let mut components = reference_path.components();
    let Some(Component::Normal(project_segment)) = components.next() else {
        return Err(not_found());
    };
    let remainder = components.as_path();

    // The remainder is joined onto a root, so it may only descend.
    if remainder
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        log::warn!("Reference '{}' escapes its project directory", reference);
        return Err(not_found());
    }

    for root in roots {
        if project_segment != root.name() {
            continue;
        }
        let candidate = root.path().join(remainder);
        if candidate.exists() && stays_inside(&candidate, root) {
            log::debug!("Resolved '{}' to {}", reference, candidate.display());
            return Ok(ResolvedFile {
                path: candidate,
                label: reference.to_string(),
                project: root.name().to_string(),
            });
        }
        log::trace!(
            "'{}' matched project '{}' but {} is missing or outside it",
            reference,
            root.name(),
            candidate.display()
        );
    }
    Err(not_found())
}

// Links inside a project may point anywhere; the real target must still be
// under the real root.
fn stays_inside(candidate: &Path, root: &ProjectRoot) -> bool {
    match (fs::canonicalize(candidate), fs::canonicalize(root.path())) {
        (Ok(target), Ok(root_path)) if target.starts_with(&root_path) => true,
        (Ok(target), Ok(_)) => {
            log::warn!(
                "{} links outside project '{}' ({})",
                candidate.display(),
                root.name(),
                target.display()
            );
            false
        }
        _ => false,
    }
}

fn resolve_by_containment(reference: &str, roots: &[ProjectRoot]) -> Result<ResolvedFile> {
    let expanded = shellexpand::tilde(reference);
    let target = normalize_path(Path::new(expanded.as_ref()))?;

    for root in roots {
        let root_path = normalize_path(root.path())?;
        if !target.starts_with(&root_path) {
            continue;
        }
        let relative = pathdiff::diff_paths(&target, &root_path).unwrap_or_default();
        let label = project_label(root.name(), &relative);
        log::debug!("Resolved '{}' to {} ({})", reference, target.display(), label);
        return Ok(ResolvedFile {
            path: target,
            label,
            project: root.name().to_string(),
        });
    }
    Err(AppError::Containment { path: target })
}

fn project_label(project: &str, relative: &Path) -> String {
    let mut label = project.to_string();
    for component in relative.components() {
        label.push('/');
        label.push_str(&component.as_os_str().to_string_lossy());
    }
    label
}

/// Makes `path` absolute against the working directory and folds `.` and
/// `..` lexically. Symlinks are not resolved.
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
