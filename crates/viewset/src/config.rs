//! View configuration loaded from YAML.
//!
//! ```rust
//! use viewset::ViewConfig;
//!
//! let config = ViewConfig::from_yaml(r#"
//! template_dir: ./views
//! auto_reload: true
//! "#).unwrap();
//! assert!(config.auto_reload);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ViewError;

/// Settings for building a [`ViewRenderer`](crate::ViewRenderer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Directory templates are read from. When unset, a file source must be
    /// supplied on the builder instead.
    pub template_dir: Option<PathBuf>,

    /// Recompile views on every render (development only).
    pub auto_reload: bool,
}

impl ViewConfig {
    /// Parses a configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ViewError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// A relative `template_dir` is resolved against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ViewError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;

        if let Some(base) = path.parent() {
            config.template_dir = config
                .template_dir
                .take()
                .map(|dir| if dir.is_relative() { base.join(dir) } else { dir });
        }
        Ok(config)
    }
}
