use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sink::DEFAULT_PUBLIC_PREFIX;

const DEFAULT_OUTPUT_DIR: &str = "static";
const LOCAL_FONTS_DIR: &str = "fonts";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {0} as TOML or YAML")]
    Parse(PathBuf),
}

/// Where artifacts go and which fonts label them. Drawing styles are
/// constants of each engine, not settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: Option<PathBuf>,
    #[serde(default = "default_system_fonts")]
    pub system_fonts: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}
fn default_public_prefix() -> String {
    DEFAULT_PUBLIC_PREFIX.to_string()
}
fn default_fonts_dir() -> Option<PathBuf> {
    let local = Path::new(LOCAL_FONTS_DIR);
    local.is_dir().then(|| local.to_path_buf())
}
fn default_system_fonts() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            public_prefix: default_public_prefix(),
            fonts_dir: default_fonts_dir(),
            system_fonts: default_system_fonts(),
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse settings TOML: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse settings YAML: {}", e))
    }

    /// Reads a settings file, trying TOML first and YAML second.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if let Ok(settings) = Self::from_toml(&content) {
            Ok(settings)
        } else if let Ok(settings) = Self::from_yaml(&content) {
            Ok(settings)
        } else {
            Err(ConfigError::Parse(path.to_path_buf()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fields_override_defaults() {
        let settings = Settings::from_toml(
            r#"
output_dir = "/srv/renders"
system_fonts = false
"#,
        )
        .expect("toml");

        assert_eq!(settings.output_dir, PathBuf::from("/srv/renders"));
        assert!(!settings.system_fonts);
        assert_eq!(settings.public_prefix, "/static");
    }

    #[test]
    fn yaml_is_accepted_when_toml_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("settings.yml");
        std::fs::write(&path, "public_prefix: /images\nfonts_dir: assets/fonts\n").expect("write");

        let settings = Settings::load(&path).expect("yaml");
        assert_eq!(settings.public_prefix, "/images");
        assert_eq!(settings.fonts_dir, Some(PathBuf::from("assets/fonts")));
        assert_eq!(settings.output_dir, PathBuf::from("static"));
    }

    #[test]
    fn missing_and_garbage_files_are_reported() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            Settings::load(&tmp.path().join("nope.toml")),
            Err(ConfigError::NotFound(_))
        ));

        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "output_dir = [1, 2\n- nope: [").expect("write");
        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse(_))));
    }
}
