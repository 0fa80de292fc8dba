//! 守护进程配置
//!
//! 非敏感项来自 JSON 配置文件；密钥只从环境变量 (可由 `.env` 提供) 读取。

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use vt_core::{Result, VeritasError};
use vt_durable::SqliteStoreConfig;
use vt_llm::{CallLimiterConfig, ResponderConfig, ReviewerConfig};

pub const DEFAULT_CONFIG_PATH: &str = "configs.json";
pub const CONFIG_PATH_ENV: &str = "VERITAS_CONFIG";
pub const RESPONDER_AUTH_KEY_ENV: &str = "RESPONDER_AUTH_KEY";
pub const REVIEWER_API_KEY_ENV: &str = "REVIEWER_API_KEY";

/// 使用内存存储的特殊数据库 url
const MEMORY_DATABASE: &str = "memory";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub responder: ResponderSettings,
    pub reviewer: ReviewerSettings,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub limits: LimitSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponderSettings {
    pub api_url: String,
    pub api_scope: String,
    pub model: String,
    pub client_id: String,
    pub rq_uid: Option<String>,
    pub temperature: f32,
    #[serde(skip)]
    pub auth_key: String,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_scope: String::new(),
            model: String::new(),
            client_id: String::new(),
            rq_uid: None,
            temperature: 0.7,
            auth_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReviewerSettings {
    pub api_url: String,
    pub model: String,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ReviewerSettings {
    fn default() -> Self {
        let defaults = ReviewerConfig::default();
        Self {
            api_url: defaults.api_url,
            model: defaults.model,
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let defaults = SqliteStoreConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
        }
    }
}

impl DatabaseSettings {
    pub fn is_in_memory(&self) -> bool {
        self.url == MEMORY_DATABASE
    }
}

/// 后端调用的超时与并发上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    pub timeout_secs: u64,
    pub max_concurrent_calls: usize,
    pub queue_timeout_secs: u64,
    pub max_idle_per_host: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_concurrent_calls: 32,
            queue_timeout_secs: 30,
            max_idle_per_host: 8,
        }
    }
}

impl LimitSettings {
    fn limiter(&self) -> CallLimiterConfig {
        CallLimiterConfig {
            max_concurrent: self.max_concurrent_calls,
            max_wait: Duration::from_secs(self.queue_timeout_secs),
        }
    }
}

impl AppConfig {
    /// 读取 `.env`、配置文件与环境变量中的密钥
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        // .env 不存在不视为错误
        let _ = dotenvy::dotenv();

        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VeritasError::Config(format!("reading {} failed: {e}", path.display()))
        })?;

        let mut config = Self::from_json_str(&content)?;
        config.apply_secrets(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| VeritasError::Config(format!("parsing config failed: {e}")))
    }

    /// 从给定的查找函数填充密钥
    pub fn apply_secrets<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(RESPONDER_AUTH_KEY_ENV) {
            self.responder.auth_key = key;
        }
        if let Some(key) = lookup(REVIEWER_API_KEY_ENV) {
            self.reviewer.api_key = key;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.responder.api_url.trim().is_empty() {
            return Err(VeritasError::Config("responder.api_url is required".to_string()));
        }
        if self.reviewer.api_url.trim().is_empty() {
            return Err(VeritasError::Config("reviewer.api_url is required".to_string()));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                VeritasError::Config(format!(
                    "invalid listen address {}:{}: {e}",
                    self.server.host, self.server.port
                ))
            })
    }

    pub fn responder_config(&self) -> ResponderConfig {
        ResponderConfig {
            api_url: self.responder.api_url.clone(),
            auth_key: self.responder.auth_key.clone(),
            client_id: self.responder.client_id.clone(),
            rq_uid: self.responder.rq_uid.clone(),
            api_scope: self.responder.api_scope.clone(),
            model: self.responder.model.clone(),
            temperature: self.responder.temperature,
            timeout: Duration::from_secs(self.limits.timeout_secs),
            max_idle_per_host: self.limits.max_idle_per_host,
            limiter: self.limits.limiter(),
        }
    }

    pub fn reviewer_config(&self) -> ReviewerConfig {
        ReviewerConfig {
            api_url: self.reviewer.api_url.clone(),
            api_key: self.reviewer.api_key.clone(),
            model: self.reviewer.model.clone(),
            timeout: Duration::from_secs(self.limits.timeout_secs),
            max_idle_per_host: self.limits.max_idle_per_host,
            limiter: self.limits.limiter(),
        }
    }

    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }
}
