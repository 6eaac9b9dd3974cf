use crate::pipeline::DEFAULT_MAX_FILE_SIZE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 監視するフォルダ。未設定ならCLI引数で与える。
    pub source_dir: Option<PathBuf>,
    /// 整理先ルート。未設定なら監視フォルダ自身。
    pub dest_dir: Option<PathBuf>,
    /// ルールファイル。未設定なら設定ディレクトリのrules.json。
    pub rules_file: Option<PathBuf>,
    pub interval_secs: u64,
    pub max_file_size_bytes: u64,
    pub dry_run_default: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            dest_dir: None,
            rules_file: None,
            interval_secs: 30,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            dry_run_default: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub rules_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "kelly", "pdf-organizer")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        rules_path: config_dir.join("rules.json"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&paths.config_path).with_context(|| {
        format!(
            "設定ファイルを読めませんでした: {}",
            paths.config_path.display()
        )
    })?;

    let config = toml::from_str::<AppConfig>(&raw).context("設定ファイルのパースに失敗しました")?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "設定ディレクトリを作成できませんでした: {}",
            paths.config_dir.display()
        )
    })?;
    let body = toml::to_string_pretty(config).context("設定のシリアライズに失敗しました")?;
    fs::write(&paths.config_path, body).with_context(|| {
        format!(
            "設定ファイルを書き込めませんでした: {}",
            paths.config_path.display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let body = toml::to_string_pretty(&config).expect("serialize");
        let parsed = toml::from_str::<AppConfig>(&body).expect("parse");
        assert_eq!(parsed.interval_secs, 30);
        assert_eq!(parsed.max_file_size_bytes, config.max_file_size_bytes);
        assert!(!parsed.dry_run_default);
    }
}
