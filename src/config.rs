//! 运行配置（canvas.json）

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::native::WindowDefaults;

/// 原生后端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum BackendKind {
    #[default]
    Winit,
    Headless,
}

/// canvas.json 配置结构
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    #[serde(default = "default_entry")]
    pub entry_script: PathBuf,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

fn default_entry() -> PathBuf { PathBuf::from("main.js") }
fn default_title() -> String { "Canvas".to_string() }
fn default_resizable() -> bool { true }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            entry_script: default_entry(),
            backend: BackendKind::default(),
            window: WindowConfig::default(),
            log_filter: None,
        }
    }
}

/// 配置加载错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CanvasConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn window_defaults(&self) -> WindowDefaults {
        WindowDefaults {
            title: self.window.title.clone(),
            resizable: self.window.resizable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CanvasConfig::from_json("{}").unwrap();
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.entry_script, PathBuf::from("main.js"));
        assert_eq!(config.window.title, "Canvas");
        assert!(config.window.resizable);
    }

    #[test]
    fn camel_case_fields() {
        let config = CanvasConfig::from_json(
            r#"{ "entryScript": "demo.js", "backend": "headless",
                 "window": { "title": "Demo", "resizable": false },
                 "logFilter": "quickcanvas=debug" }"#,
        )
        .unwrap();
        assert_eq!(config.entry_script, PathBuf::from("demo.js"));
        assert_eq!(config.backend, BackendKind::Headless);
        assert_eq!(config.window_defaults(), WindowDefaults { title: "Demo".into(), resizable: false });
        assert_eq!(config.log_filter.as_deref(), Some("quickcanvas=debug"));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvas.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = CanvasConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("canvas.json"));
    }
}
