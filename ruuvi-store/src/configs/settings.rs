use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::services::DEFAULT_POINT_BUDGET;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to merge settings layers: {0}")]
    Merge(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    /// Drop and recreate the schema on startup. Destroys stored readings.
    #[serde(default)]
    pub clean_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Point budget for "auto" resolution selection.
    #[serde(default = "default_point_budget")]
    pub point_budget: usize,
}

fn default_point_budget() -> usize {
    DEFAULT_POINT_BUDGET
}

impl Default for Query {
    fn default() -> Self {
        Self {
            point_budget: DEFAULT_POINT_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub database: Database,
    #[serde(default)]
    pub query: Query,
}

impl Settings {
    /// Loads `configs/default.toml`, overlaid by `configs/{RUN_MODE}.toml`
    /// when present.
    pub fn new() -> Result<Self, SettingsError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let base = read_value("configs/default.toml")?;
        let overlay_path = format!("configs/{run_mode}.toml");

        if Path::new(&overlay_path).exists() {
            let overlay = read_value(&overlay_path)?;
            Self::merge(base, overlay)
        } else {
            Ok(serde_json::from_value(base)?)
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Ok(serde_json::from_value(read_value(path)?)?)
    }

    /// Shallow-merges two settings layers; non-null keys on the right win.
    pub fn merge<L, R, T>(left: L, right: R) -> Result<T, SettingsError>
    where
        L: Serialize,
        R: Serialize,
        T: DeserializeOwned,
    {
        let mut left_map = serde_json::to_value(&left)?
            .as_object()
            .cloned()
            .unwrap_or_default();

        let mut right_map = serde_json::to_value(&right)?
            .as_object()
            .cloned()
            .unwrap_or_default();

        right_map.retain(|_, v| !v.is_null());
        left_map.extend(right_map);

        Ok(serde_json::from_value(serde_json::Value::Object(left_map))?)
    }
}

fn read_value(path: impl AsRef<Path>) -> Result<serde_json::Value, SettingsError> {
    let raw = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&raw)?;
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_settings() {
        let raw = r#"
            [logger]
            level = "debug"

            [database]
            url = "sqlite:data/readings.db"
            clean_start = false

            [query]
            point_budget = 200
        "#;
        let value: toml::Value = toml::from_str(raw).unwrap();
        let settings: Settings = serde_json::from_value(serde_json::to_value(value).unwrap()).unwrap();

        assert_eq!(settings.logger.level, "debug");
        assert_eq!(settings.database.url, "sqlite:data/readings.db");
        assert_eq!(settings.query.point_budget, 200);
    }

    #[test]
    fn loads_settings_from_file() {
        let path = std::env::temp_dir().join("ruuvi-store-settings-test.toml");
        fs::write(
            &path,
            "[logger]\nlevel = \"warn\"\n\n[database]\nurl = \"sqlite::memory:\"\n",
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.logger.level, "warn");
        assert_eq!(settings.query.point_budget, DEFAULT_POINT_BUDGET);

        fs::remove_file(&path).ok();

        assert!(Settings::from_file("configs/no-such-file.toml").is_err());
    }

    #[test]
    fn query_section_is_optional() {
        let raw = r#"
            [logger]
            level = "info"

            [database]
            url = "sqlite::memory:"
        "#;
        let value: toml::Value = toml::from_str(raw).unwrap();
        let settings: Settings = serde_json::from_value(serde_json::to_value(value).unwrap()).unwrap();

        assert!(!settings.database.clean_start);
        assert_eq!(settings.query.point_budget, DEFAULT_POINT_BUDGET);
    }

    #[test]
    fn merge_prefers_right_layer() {
        let base: Settings = {
            let value: toml::Value = toml::from_str(
                "[logger]\nlevel = \"info\"\n[database]\nurl = \"sqlite:a.db\"",
            )
            .unwrap();
            serde_json::from_value(serde_json::to_value(value).unwrap()).unwrap()
        };
        let overlay = serde_json::json!({
            "database": { "url": "sqlite::memory:", "clean_start": true }
        });

        let merged: Settings = Settings::merge(&base, &overlay).unwrap();
        assert_eq!(merged.database.url, "sqlite::memory:");
        assert!(merged.database.clean_start);
        assert_eq!(merged.logger.level, "info");
    }
}
