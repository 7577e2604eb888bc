use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AppResult;
use crate::graph::MIN_DRAG_THRESHOLD;

const APP_DIR: &str = "expense-sheets";

/// 用户配置，保存在 `<config dir>/expense-sheets/settings.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 覆盖默认的数据目录
    pub data_dir: Option<PathBuf>,
    /// 图表一屏显示的月份数
    pub graph_window: usize,
    /// 横向拖动多少像素翻一个月
    pub drag_threshold: f32,
    pub currency_symbol: String,
    /// RUST_LOG 未设置时使用
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            graph_window: 4,
            drag_threshold: 40.0,
            currency_symbol: "€".to_string(),
            log_filter: "expense_sheets=info".to_string(),
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push("settings.json");
        path
    }

    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// 文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&contents)?;
        settings.graph_window = settings.graph_window.max(1);
        settings.drag_threshold = settings.drag_threshold.max(MIN_DRAG_THRESHOLD);
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => {
                let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
                path.push(APP_DIR);
                path
            }
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("expenses.db")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir().join(".lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.graph_window, 4);
        assert_eq!(settings.currency_symbol, "€");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "graph_window": 6, "data_dir": "/tmp/sheets" }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.graph_window, 6);
        assert_eq!(settings.drag_threshold, 40.0);
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/sheets/expenses.db"));
        assert_eq!(settings.lock_path(), PathBuf::from("/tmp/sheets/.lock"));
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "graph_window": 0 }"#).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().graph_window, 1);
    }

    #[test]
    fn test_tiny_drag_threshold_is_clamped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "drag_threshold": 0.0 }"#).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().drag_threshold, MIN_DRAG_THRESHOLD);

        std::fs::write(&path, r#"{ "drag_threshold": -20.0 }"#).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().drag_threshold, MIN_DRAG_THRESHOLD);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, crate::error::AppError::Config(_)));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sub").join("settings.json");
        let settings = Settings { currency_symbol: "$".to_string(), ..Settings::default() };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }
}
