//! User configuration for the SDF LSP.
//!
//! Configuration is stored at `~/.config/sdf/config.json`. Editors can
//! override any field through `initializationOptions`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// User configuration for the SDF LSP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SdfUserConfig {
    /// Extensions (without the dot) of files indexed for type completion.
    pub file_extensions: Vec<String>,

    /// Glob patterns, relative to the workspace root, of files to skip.
    pub exclude: Vec<String>,

    /// Upper bound on the number of completion items returned.
    pub max_completions: Option<usize>,
}

impl Default for SdfUserConfig {
    fn default() -> Self {
        Self {
            file_extensions: vec!["sdf".to_string()],
            exclude: Vec::new(),
            max_completions: None,
        }
    }
}

/// Settings passed by the editor; anything left out keeps its current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub file_extensions: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub max_completions: Option<usize>,
}

impl SdfUserConfig {
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(extensions) = overrides.file_extensions {
            self.file_extensions = extensions;
        }
        if let Some(exclude) = overrides.exclude {
            self.exclude = exclude;
        }
        if overrides.max_completions.is_some() {
            self.max_completions = overrides.max_completions;
        }
        self
    }

    /// Whether `path` has one of the indexed extensions.
    pub fn is_schema_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.file_extensions.iter().any(|e| e == ext))
    }
}

/// Get the path to the user config file.
///
/// Returns `~/.config/sdf/config.json` on Unix, or the equivalent
/// platform-specific config directory on other platforms.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sdf").join("config.json"))
}

/// Load the user configuration from disk.
///
/// Returns `Ok(None)` if the config file doesn't exist.
/// Returns `Err` if the file exists but couldn't be parsed.
pub fn load_config() -> Result<Option<SdfUserConfig>, LoadConfigError> {
    let Some(path) = config_path() else {
        debug!("No config directory available");
        return Ok(None);
    };
    load_config_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Option<SdfUserConfig>, LoadConfigError> {
    if !path.exists() {
        debug!(?path, "Config file does not exist");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| LoadConfigError::Io {
        path: path.to_path_buf(),
        error: e,
    })?;

    let config: SdfUserConfig =
        serde_json::from_str(&content).map_err(|e| LoadConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    info!(?path, extensions = ?config.file_extensions, "Loaded user config");
    Ok(Some(config))
}

/// Error loading the user config.
#[derive(Debug)]
pub enum LoadConfigError {
    Io { path: PathBuf, error: std::io::Error },
    Parse { path: PathBuf, error: String },
}

impl std::fmt::Display for LoadConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadConfigError::Io { path, error } => {
                write!(f, "Failed to read config at {}: {}", path.display(), error)
            }
            LoadConfigError::Parse { path, error } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for LoadConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sdf-lsp-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_none() {
        let path = std::env::temp_dir().join("sdf-lsp-config-does-not-exist.json");
        assert!(load_config_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_file("partial.json", r#"{ "exclude": ["generated/**"] }"#);
        let config = load_config_from(&path).unwrap().unwrap();
        assert_eq!(config.file_extensions, vec!["sdf"]);
        assert_eq!(config.exclude, vec!["generated/**"]);
        assert_eq!(config.max_completions, None);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_file("broken.json", "{ exclude: ");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, LoadConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse config at"));
    }

    #[test]
    fn test_overrides() {
        let overrides: ConfigOverrides =
            serde_json::from_value(serde_json::json!({ "maxCompletions": 20 })).unwrap();
        let config = SdfUserConfig::default().with_overrides(overrides);
        assert_eq!(config.max_completions, Some(20));
        assert_eq!(config.file_extensions, vec!["sdf"]);

        assert!(config.is_schema_file(Path::new("/p/model.sdf")));
        assert!(!config.is_schema_file(Path::new("/p/model.go")));
    }
}
