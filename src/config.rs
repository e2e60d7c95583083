//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件
//! Environment variables override file values / 环境变量优先于配置文件

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Talk data configuration / 对话数据配置
    #[serde(default)]
    pub talk: TalkConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Talk data and query configuration / 对话数据与查询配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkConfig {
    /// Enabled language codes / 启用的语言
    pub languages: Vec<String>,
    /// Language served at `/` / 默认语言
    pub default_language: String,
    /// Local directory or http(s) base URL of the talk data / 数据目录或远程地址
    pub data_path: String,
    /// File name per language, `{lang}` is replaced / 数据文件名模板
    pub file_pattern: String,
    /// Localized text table / 多语言文本表
    pub text_path: String,
    /// Result cap of a keyword query / 查询结果上限
    pub max_results: usize,
    /// Entries per memo cache, 0 disables caching / 缓存容量
    pub cache_capacity: usize,
    /// `Cache-Control: max-age` of successful responses (seconds) / 响应缓存时间
    pub cache_max_age: u64,
    /// Search worker threads, 0 means one per CPU / 查询线程数
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8180,
        }
    }
}

impl Default for TalkConfig {
    fn default() -> Self {
        Self {
            languages: vec!["CHS".to_string(), "EN".to_string()],
            default_language: "CHS".to_string(),
            data_path: "data".to_string(),
            file_pattern: "GI_Talk_{lang}.parquet".to_string(),
            text_path: "text.json".to_string(),
            max_results: 1000,
            cache_capacity: 128,
            cache_max_age: 600,
            workers: 0,
        }
    }
}

impl TalkConfig {
    /// Worker thread count, resolving 0 to the CPU count / 实际线程数
    pub fn worker_threads(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides / 应用环境变量覆盖
    ///
    /// `LANGS`, `DEFAULT_LANG`, `TALK_DATA_PATH`, `QUERY_MAX_RESULTS`
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(langs) = var("LANGS") {
            self.talk.languages = langs
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
        }
        if let Some(lang) = var("DEFAULT_LANG") {
            self.talk.default_language = lang.trim().to_string();
        }
        if let Some(path) = var("TALK_DATA_PATH") {
            self.talk.data_path = path;
        }
        if let Some(max) = var("QUERY_MAX_RESULTS") {
            self.talk.max_results = max
                .trim()
                .parse()
                .map_err(|e| format!("Invalid QUERY_MAX_RESULTS {:?}: {}", max, e))?;
        }
        Ok(())
    }

    /// Normalize language codes and check consistency / 规范化并校验
    pub fn validate(&mut self) -> Result<(), String> {
        let mut languages: Vec<String> = Vec::with_capacity(self.talk.languages.len());
        for lang in &self.talk.languages {
            let lang = lang.trim().to_uppercase();
            if !lang.is_empty() && !languages.contains(&lang) {
                languages.push(lang);
            }
        }
        if languages.is_empty() {
            return Err("At least one language must be configured".to_string());
        }

        let default_language = self.talk.default_language.trim().to_uppercase();
        if !languages.contains(&default_language) {
            return Err(format!(
                "Default language {} is not one of {}",
                default_language,
                languages.join(",")
            ));
        }
        if self.talk.max_results == 0 {
            return Err("max_results must be at least 1".to_string());
        }

        self.talk.languages = languages;
        self.talk.default_language = default_language;
        Ok(())
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration, apply environment overrides and validate / 加载并校验配置
pub fn load_config() -> Result<AppConfig, String> {
    let mut config = load_config_from(&get_config_path())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
