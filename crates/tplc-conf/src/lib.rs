mod diagnostics;

use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::diagnostics::DiagnosticSeverity;
pub use crate::diagnostics::DiagnosticsConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Invalid delimiters {0:?}: both the opening and closing delimiter must be non-empty")]
    Delimiters([String; 2]),
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    /// Interpolation delimiters, `["{{", "}}"]` when unset.
    pub delimiters: Option<[String; 2]>,
    pub output_source_range: bool,
    pub optimize: bool,
    pub preserve_whitespace: bool,
    pub comments: bool,
    pub allow_runtime_compilation: bool,
    pub diagnostics: DiagnosticsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            delimiters: None,
            output_source_range: false,
            optimize: true,
            preserve_whitespace: true,
            comments: false,
            allow_runtime_compilation: true,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Settings {
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "tplc", "tplc")
            .map(|proj_dirs| proj_dirs.config_dir().join("tplc.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            tracing::debug!(path = %path.display(), "adding user config source");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(project_root.join(".tplc.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("tplc.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        if let Some(delimiters) = &settings.delimiters {
            if delimiters.iter().any(String::is_empty) {
                return Err(ConfigError::Delimiters(delimiters.clone()));
            }
        }

        Ok(settings)
    }
}
