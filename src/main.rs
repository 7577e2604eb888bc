#![windows_subsystem = "windows"]

mod app;
mod config;
mod db;
mod dialogs;
mod error;
mod forms;
mod graph;
mod models;
mod screen;
mod state;
mod theme;

use eframe::egui;
use fs2::FileExt;
use std::fs::File;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use config::Settings;

fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

/// 独占锁文件，保证只运行一个实例
fn try_lock(lock_path: &Path) -> Option<File> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(lock_path)
        .ok()?;
    // 进程退出时锁随文件句柄释放
    file.try_lock_exclusive().ok()?;
    Some(file)
}

fn main() -> eframe::Result<()> {
    let (settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    init_logging(&settings.log_filter);
    let settings_path = Settings::default_path();
    match settings_error {
        Some(err) => error!(error = %err, path = %settings_path.display(), "ignoring settings file"),
        None if !settings_path.exists() => {
            // 首次运行写出默认配置，方便手动修改
            if let Err(err) = settings.save_to(&settings_path) {
                warn!(error = %err, "could not write default settings");
            }
        }
        None => {}
    }

    let _lock = match try_lock(&settings.lock_path()) {
        Some(lock) => lock,
        None => {
            warn!("another instance is already running");
            return Ok(());
        }
    };

    let app = match App::new(settings) {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "failed to open expense database");
            return Err(eframe::Error::AppCreation(Box::new(err)));
        }
    };
    info!("starting expense sheets");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 760.0])
            .with_min_inner_size([560.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Expense Sheets",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_lock_on_same_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join(".lock");

        let first = try_lock(&path);
        assert!(first.is_some());
        assert!(try_lock(&path).is_none());

        drop(first);
        assert!(try_lock(&path).is_some());
    }
}
