use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// CORS 允许的 origins 列表，为空时允许所有来源（开发模式）
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            cors_allowed_origins: Vec::new(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            evaluator: EvaluatorConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 完整数据库连接 URL，SQLite 示例：`sqlite://data/vishub.db?mode=rwc`
    #[serde(default = "default_db_url")]
    pub url: String,
    /// 本地数据目录（凭据加密密钥等）
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            data_dir: default_data_dir(),
        }
    }
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        self.url.clone()
    }
}

fn default_db_url() -> String {
    "sqlite://data/vishub.db?mode=rwc".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_expire_secs")]
    pub token_expire_secs: u64,
    #[serde(default = "default_username")]
    pub default_username: String,
    #[serde(default = "default_password")]
    pub default_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_expire_secs: default_token_expire_secs(),
            default_username: default_username(),
            default_password: default_password(),
        }
    }
}

fn default_token_expire_secs() -> u64 {
    86400
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "changeme".to_string()
}

/// 提示词评估器配置。
/// provider = "random" 走伪随机占位实现；"openai" 走 chat/completions 协议。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default = "default_evaluator_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// 伪随机实现的提及概率
    #[serde(default = "default_mention_probability")]
    pub mention_probability: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            provider: default_evaluator_provider(),
            api_key: None,
            model: None,
            base_url: None,
            timeout_secs: None,
            mention_probability: default_mention_probability(),
        }
    }
}

fn default_evaluator_provider() -> String {
    "random".to_string()
}

fn default_mention_probability() -> f64 {
    0.4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_schedule_enabled")]
    pub enabled: bool,
    #[serde(default = "default_schedule_tick_secs")]
    pub tick_secs: u64,
    #[serde(default = "default_weekly_interval_secs")]
    pub weekly_interval_secs: u64,
    #[serde(default = "default_monthly_interval_secs")]
    pub monthly_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: default_schedule_enabled(),
            tick_secs: default_schedule_tick_secs(),
            weekly_interval_secs: default_weekly_interval_secs(),
            monthly_interval_secs: default_monthly_interval_secs(),
        }
    }
}

fn default_schedule_enabled() -> bool {
    true
}

fn default_schedule_tick_secs() -> u64 {
    3600
}

fn default_weekly_interval_secs() -> u64 {
    604800 // 7 days
}

fn default_monthly_interval_secs() -> u64 {
    2592000 // 30 days
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
