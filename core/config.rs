use crate::error::{AppError, Result};
use crate::project::ProjectRoot;
use crate::resolve::ResolutionPolicy;
use crate::tree::{DEFAULT_IGNORED_DIRS, IgnoreSet};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_OUTPUT_FILENAME: &str = "project_export.txt";

const KNOWN_KEYS: &[&str] = &[
    "projects",
    "files",
    "ignored_dirs",
    "resolution",
    "output_file",
];

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Config {
    pub projects: Vec<PathBuf>,
    pub files: Vec<String>,
    pub ignored_dirs: Vec<String>,
    pub resolution: ResolutionPolicy,
    pub output_file: PathBuf,
}

impl Config {
    pub fn resolve_config_path(cli_config_path: Option<&PathBuf>) -> PathBuf {
        match cli_config_path {
            Some(path) => {
                log::debug!("Using specified config file path: {}", path.display());
                path.clone()
            }
            None => {
                log::debug!("Using default config file path: {}", DEFAULT_CONFIG_FILENAME);
                PathBuf::from(DEFAULT_CONFIG_FILENAME)
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let content = fs::read_to_string(config_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::ConfigNotFound(config_path.to_path_buf()),
            _ => AppError::FileRead {
                path: config_path.to_path_buf(),
                source: e,
            },
        })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|source| AppError::ConfigParse {
                path: config_path.to_path_buf(),
                source,
            })?;
        Self::from_value(value)
    }

    /// Builds a config from an already parsed JSON document, checking each key.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(AppError::Config(
                "The configuration must be a JSON object".to_string(),
            ));
        };

        for key in map.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            log::warn!("Ignoring unknown configuration key '{}'", key);
        }

        let projects: Vec<String> = required_key(&map, "projects")?;
        let projects = projects
            .iter()
            .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
            .collect();
        let resolution: ResolutionPolicy = optional_key(&map, "resolution")?.unwrap_or_default();
        let files: Option<Vec<String>> = optional_key(&map, "files")?;
        if files.is_none() && resolution.requires_files() {
            return Err(AppError::ConfigKey {
                key: "files",
                reason: format!("is required with the '{}' resolution policy", resolution),
            });
        }
        let ignored_dirs =
            optional_key(&map, "ignored_dirs")?.unwrap_or_else(default_ignored_dirs);
        let output_file = optional_key(&map, "output_file")?
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));

        let config = Config {
            projects,
            files: files.unwrap_or_default(),
            ignored_dirs,
            resolution,
            output_file,
        };
        config.validate()?;
        log::debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Re-checked after command line overrides, which may switch policy.
    pub fn validate(&self) -> Result<()> {
        if self.projects.is_empty() {
            return Err(AppError::ConfigKey {
                key: "projects",
                reason: "must list at least one project directory".to_string(),
            });
        }
        if self.resolution.requires_files() && self.files.is_empty() {
            return Err(AppError::ConfigKey {
                key: "files",
                reason: format!(
                    "must list at least one file with the '{}' resolution policy",
                    self.resolution
                ),
            });
        }
        Ok(())
    }

    pub fn project_roots(&self) -> Vec<ProjectRoot> {
        self.projects.iter().map(ProjectRoot::new).collect()
    }

    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::new(self.ignored_dirs.iter().cloned())
    }

    /// Starter configuration printed by `xexport config`.
    pub fn sample() -> Self {
        Config {
            projects: vec![PathBuf::from("./my-project")],
            files: vec!["my-project/src/main.rs".to_string()],
            ignored_dirs: default_ignored_dirs(),
            resolution: ResolutionPolicy::default(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn default_ignored_dirs() -> Vec<String> {
    DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect()
}

fn optional_key<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<T>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| AppError::ConfigKey {
                key,
                reason: format!("has an invalid value: {}", e),
            }),
    }
}

fn required_key<T: DeserializeOwned>(map: &Map<String, Value>, key: &'static str) -> Result<T> {
    optional_key(map, key)?.ok_or_else(|| AppError::ConfigKey {
        key,
        reason: "is missing".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_value(json!({ "projects": ["/p/app"] })).unwrap();

        assert_eq!(config.projects, vec![PathBuf::from("/p/app")]);
        assert!(config.files.is_empty());
        assert_eq!(config.ignored_dirs.len(), DEFAULT_IGNORED_DIRS.len());
        assert_eq!(config.resolution, ResolutionPolicy::NamePrefix);
        assert_eq!(config.output_file, PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        assert!(config.ignore_set().contains("node_modules"));
    }

    #[test]
    fn explicit_keys_override_defaults() {
        let config = Config::from_value(json!({
            "projects": ["/p/app", "/p/web"],
            "files": ["/p/app/main.go"],
            "ignored_dirs": ["dist"],
            "resolution": "path_containment",
            "output_file": "snapshot.txt"
        }))
        .unwrap();

        assert_eq!(config.project_roots().len(), 2);
        assert_eq!(config.files, vec!["/p/app/main.go".to_string()]);
        assert!(config.ignore_set().contains("dist"));
        assert!(!config.ignore_set().contains("node_modules"));
        assert_eq!(config.resolution, ResolutionPolicy::PathContainment);
        assert_eq!(config.output_file, PathBuf::from("snapshot.txt"));
    }

    #[test]
    fn projects_key_is_required_and_non_empty() {
        for value in [
            json!({}),
            json!({ "projects": [] }),
            json!({ "projects": "app" }),
            json!({ "projects": [1, 2] }),
        ] {
            let err = Config::from_value(value).unwrap_err();
            assert!(
                matches!(err, AppError::ConfigKey { key: "projects", .. }),
                "{err}"
            );
        }
    }

    #[test]
    fn files_required_only_under_containment() {
        let err = Config::from_value(json!({
            "projects": ["/p/app"],
            "resolution": "path_containment"
        }))
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigKey { key: "files", .. }));

        let err = Config::from_value(json!({
            "projects": ["/p/app"],
            "files": [],
            "resolution": "path_containment"
        }))
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigKey { key: "files", .. }));

        let err = Config::from_value(json!({ "projects": ["/p/app"], "files": "a" })).unwrap_err();
        assert!(matches!(err, AppError::ConfigKey { key: "files", .. }));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = Config::from_value(json!({ "projects": ["/p/app"], "resolution": "glob" }))
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigKey { key: "resolution", .. }));
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = Config::from_value(json!(["/p/app"])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "{err}");

        let dir = TempDir::new().unwrap();
        let array = dir.path().join("array.json");
        fs::write(&array, r#"["./app"]"#).unwrap();
        let err = Config::load_from_path(&array).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "{err}");
    }

    #[test]
    fn load_distinguishes_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();

        let missing = Config::load_from_path(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(missing, AppError::ConfigNotFound(_)));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ \"projects\": [").unwrap();
        let malformed = Config::load_from_path(&broken).unwrap_err();
        assert!(matches!(malformed, AppError::ConfigParse { .. }));

        let good = dir.path().join("good.json");
        fs::write(&good, r#"{ "projects": ["./app"], "files": ["app/x.rs"] }"#).unwrap();
        let config = Config::load_from_path(&good).unwrap();
        assert_eq!(config.files, vec!["app/x.rs".to_string()]);
    }

    #[test]
    fn sample_round_trips_through_loader() {
        let json = Config::sample().to_pretty_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(Config::from_value(value).unwrap(), Config::sample());
    }
}
