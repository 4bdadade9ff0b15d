use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::output::csv::EXPORT_FILE_NAME;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_progress_path")]
    pub progress_path: String,
}

/// Where university rows come from. An empty `source` selects the
/// built-in table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub progress_path: Option<String>,
    pub data_source: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/application-tracker/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(progress_path) = overrides.progress_path {
            self.storage.progress_path = progress_path;
        }
        if let Some(source) = overrides.data_source {
            self.data.source = source;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_progress_path(&self) -> PathBuf {
        expand_tilde(&self.storage.progress_path)
    }

    pub fn resolved_data_source(&self) -> Option<PathBuf> {
        let source = self.data.source.trim();
        if source.is_empty() {
            None
        } else {
            Some(expand_tilde(source))
        }
    }

    pub fn default_template() -> String {
        let template = r#"[storage]
progress_path = "~/.local/share/application-tracker/application_progress.json"

[data]
# CSV file with University, Category, Program, Deadlines, Application_Fee,
# Requirements, Expected_Qualities, Apply_Link and Program_Fee columns.
# Leave empty to use the built-in table.
source = ""

[export]
file_name = "university_applications.csv"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            progress_path: default_progress_path(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
    }
}

fn default_progress_path() -> String {
    "~/.local/share/application-tracker/application_progress.json".to_string()
}

fn default_export_file_name() -> String {
    EXPORT_FILE_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::{Config, ConfigOverrides};

    #[test]
    fn template_matches_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template parses");
        assert_eq!(parsed, Config::default());
        assert!(parsed.resolved_data_source().is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[data]\nsource = \"/srv/universities.csv\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(
            config.resolved_data_source(),
            Some(PathBuf::from("/srv/universities.csv"))
        );
        assert_eq!(config.export.file_name, "university_applications.csv");
    }

    #[test]
    fn overrides_replace_paths() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            progress_path: Some("progress/application_progress.json".to_string()),
            data_source: None,
        });
        assert_eq!(
            config.resolved_progress_path(),
            PathBuf::from("progress/application_progress.json")
        );
        assert!(config.resolved_data_source().is_none());
    }

    #[test]
    fn written_template_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");
        Config::write_template(&path).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }
}
