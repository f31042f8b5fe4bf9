use crate::config::Config;
use crate::error::{AppError, Result};
use crate::project::ProjectRoot;
use crate::resolve::{ResolutionPolicy, ResolvedFile, resolve_reference};
use crate::tree::render_tree;
use std::fmt;
use std::fs;
use std::path::Path;

pub const PROJECTS_HEADER: &str = "****** Projects: ******";
pub const EXPORTED_FILES_HEADER: &str = "****** Exported files: ******";
pub const NO_FILES_EXPORTED: &str = "****** No files exported. ******";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    Content(String),
    Error(String),
}

/// One labeled section of the exported files dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub label: String,
    pub body: RecordBody,
}

impl ExportRecord {
    pub fn content(label: impl Into<String>, content: String) -> Self {
        Self {
            label: label.into(),
            body: RecordBody::Content(content),
        }
    }

    pub fn failed(label: impl Into<String>, message: String) -> Self {
        Self {
            label: label.into(),
            body: RecordBody::Error(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, RecordBody::Error(_))
    }
}

impl fmt::Display for ExportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "• {}:", self.label)?;
        writeln!(f)?;
        match &self.body {
            RecordBody::Content(content) => writeln!(f, "{}", content),
            RecordBody::Error(message) => writeln!(f, "Error: {}", message),
        }
    }
}

/// Resolves and reads every requested file, in request order.
///
/// Read failures always become error records. A reference that cannot be
/// resolved becomes an error record under [`ResolutionPolicy::NamePrefix`]
/// and aborts the whole call under [`ResolutionPolicy::PathContainment`].
pub fn export_files<S: AsRef<str>>(
    requests: &[S],
    roots: &[ProjectRoot],
    policy: ResolutionPolicy,
) -> Result<Vec<ExportRecord>> {
    log::debug!(
        "Exporting {} file(s) with policy {}",
        requests.len(),
        policy
    );
    let mut records = Vec::with_capacity(requests.len());
    for request in requests {
        let reference = request.as_ref();
        match resolve_reference(reference, roots, policy) {
            Ok(resolved) => records.push(read_record(resolved)),
            Err(e) if e.is_resolution() && !policy.aborts_on_unresolved() => {
                log::warn!("{}", e);
                records.push(ExportRecord::failed(reference, e.to_string()));
            }
            Err(e) => {
                log::error!("Aborting export at '{}': {}", reference, e);
                return Err(e);
            }
        }
    }
    log::info!(
        "Exported {} file(s), {} with errors",
        records.len(),
        records.iter().filter(|r| r.is_error()).count()
    );
    Ok(records)
}

fn read_record(resolved: ResolvedFile) -> ExportRecord {
    match read_text(&resolved.path) {
        Ok(content) => {
            log::trace!("Read {} bytes from {}", content.len(), resolved.path.display());
            ExportRecord::content(resolved.label, content)
        }
        Err(e) => {
            log::warn!("Could not read {}: {}", resolved.path.display(), e);
            ExportRecord::failed(resolved.label, e.to_string())
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| AppError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8(bytes)?)
}

pub fn render_records(records: &[ExportRecord]) -> String {
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins the projects section with the exported files section, or with the
/// "no files" marker when nothing was requested.
pub fn assemble_document(tree: &str, exported: Option<&str>) -> String {
    match exported {
        Some(files) => format!(
            "{}\n\n{}\n{}\n\n{}",
            PROJECTS_HEADER, tree, EXPORTED_FILES_HEADER, files
        ),
        None => format!("{}\n\n{}\n{}\n", PROJECTS_HEADER, tree, NO_FILES_EXPORTED),
    }
}

/// Runs the full pipeline for a loaded configuration and returns the document.
/// Nothing is written; a fatal error leaves no partial output behind.
pub fn build_export_document(config: &Config) -> Result<String> {
    let roots = config.project_roots();
    let ignore = config.ignore_set();

    let tree = render_tree(&roots, &ignore);
    let exported = if config.files.is_empty() {
        log::debug!("No files requested for export.");
        None
    } else {
        let records = export_files(&config.files, &roots, config.resolution)?;
        Some(render_records(&records))
    };
    Ok(assemble_document(&tree, exported.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MAIN_GO: &str = "package main\n\nfunc main() {\r\n\tprintln(\"héllo\")\n}\n";

    fn project(dir: &TempDir) -> ProjectRoot {
        let app = dir.path().join("app");
        fs::create_dir_all(app.join("src")).unwrap();
        fs::create_dir_all(app.join("node_modules")).unwrap();
        fs::write(app.join("src/main.go"), MAIN_GO).unwrap();
        fs::write(app.join("node_modules/x.js"), "module.exports = 1;").unwrap();
        fs::write(app.join("blob.bin"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        ProjectRoot::new(app)
    }

    fn config_for(dir: &TempDir, files: Vec<String>, resolution: ResolutionPolicy) -> Config {
        Config {
            projects: vec![dir.path().join("app")],
            files,
            ignored_dirs: vec!["node_modules".to_string()],
            resolution,
            output_file: PathBuf::from("out.txt"),
        }
    }

    #[test]
    fn name_prefix_exports_content_verbatim() {
        let dir = TempDir::new().unwrap();
        let roots = [project(&dir)];

        let records =
            export_files(&["app/src/main.go"], &roots, ResolutionPolicy::NamePrefix).unwrap();

        assert_eq!(
            records,
            vec![ExportRecord::content("app/src/main.go", MAIN_GO.to_string())]
        );
        let on_disk = fs::read(dir.path().join("app/src/main.go")).unwrap();
        match &records[0].body {
            RecordBody::Content(content) => assert_eq!(content.as_bytes(), on_disk.as_slice()),
            RecordBody::Error(e) => panic!("unexpected error record: {e}"),
        }
    }

    #[test]
    fn name_prefix_records_unresolved_and_continues() {
        let dir = TempDir::new().unwrap();
        let roots = [project(&dir)];
        let requests = ["app/missing.go", "app/src/main.go", "other/readme.md"];

        let records = export_files(&requests, &roots, ResolutionPolicy::NamePrefix).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_error());
        assert!(!records[1].is_error());
        assert!(records[2].is_error());
        assert_eq!(records[1].label, "app/src/main.go");
        match &records[2].body {
            RecordBody::Error(message) => assert!(message.contains("other/readme.md")),
            RecordBody::Content(_) => panic!("expected an error record"),
        }
    }

    #[test]
    fn read_failures_are_inline_under_both_policies() {
        let dir = TempDir::new().unwrap();
        let roots = [project(&dir)];
        let blob = dir.path().join("app/blob.bin");
        let src_dir = dir.path().join("app/src");

        let prefixed =
            export_files(&["app/blob.bin", "app/src"], &roots, ResolutionPolicy::NamePrefix)
                .unwrap();
        assert!(prefixed.iter().all(ExportRecord::is_error));

        let contained = export_files(
            &[blob.to_string_lossy(), src_dir.to_string_lossy()],
            &roots,
            ResolutionPolicy::PathContainment,
        )
        .unwrap();
        assert_eq!(contained.len(), 2);
        assert!(contained.iter().all(ExportRecord::is_error));
        assert_eq!(contained[0].label, "app/blob.bin");
    }

    #[test]
    fn containment_failure_aborts_batch() {
        let dir = TempDir::new().unwrap();
        let roots = [project(&dir)];
        let inside = dir.path().join("app/src/main.go");

        let result = export_files(
            &[inside.to_string_lossy().into_owned(), "/etc/passwd".to_string()],
            &roots,
            ResolutionPolicy::PathContainment,
        );

        assert!(matches!(result, Err(AppError::Containment { .. })));
    }

    #[test]
    fn record_layout() {
        let ok = ExportRecord::content("app/a.txt", "alpha".to_string());
        let bad = ExportRecord::failed("app/b.txt", "boom".to_string());

        assert_eq!(ok.to_string(), "• app/a.txt:\n\nalpha\n");
        assert_eq!(
            render_records(&[ok, bad]),
            "• app/a.txt:\n\nalpha\n\n• app/b.txt:\n\nError: boom\n"
        );
    }

    #[test]
    fn document_sections() {
        let with_files = assemble_document("TREE\n", Some("FILES"));
        assert_eq!(
            with_files,
            format!("{PROJECTS_HEADER}\n\nTREE\n\n{EXPORTED_FILES_HEADER}\n\nFILES")
        );

        let without = assemble_document("TREE\n", None);
        assert_eq!(
            without,
            format!("{PROJECTS_HEADER}\n\nTREE\n\n{NO_FILES_EXPORTED}\n")
        );
    }

    #[test]
    fn document_combines_tree_and_files() {
        let dir = TempDir::new().unwrap();
        project(&dir);
        let config = config_for(
            &dir,
            vec!["app/src/main.go".to_string()],
            ResolutionPolicy::NamePrefix,
        );

        let document = build_export_document(&config).unwrap();

        assert!(document.starts_with(PROJECTS_HEADER));
        assert!(document.contains("• Project structure of app:"));
        assert!(!document.contains("x.js"));
        assert!(document.contains(EXPORTED_FILES_HEADER));
        assert!(document.contains(&format!("• app/src/main.go:\n\n{MAIN_GO}\n")));
    }

    #[test]
    fn document_without_files_has_placeholder() {
        let dir = TempDir::new().unwrap();
        project(&dir);
        let config = config_for(&dir, Vec::new(), ResolutionPolicy::NamePrefix);

        let document = build_export_document(&config).unwrap();

        assert!(document.ends_with(&format!("{NO_FILES_EXPORTED}\n")));
        assert!(!document.contains(EXPORTED_FILES_HEADER));
    }

    #[test]
    fn document_fails_on_containment_violation() {
        let dir = TempDir::new().unwrap();
        project(&dir);
        let config = config_for(
            &dir,
            vec!["/etc/passwd".to_string()],
            ResolutionPolicy::PathContainment,
        );

        let err = build_export_document(&config).unwrap_err();

        assert!(matches!(err, AppError::Containment { ref path } if path == Path::new("/etc/passwd")));
    }
}
