use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use vishub_ai::{DryRunEstimator, PromptEvaluator};
use vishub_storage::HubStore;

/// 每个请求处理器共享的应用状态。
/// 评估器与估算器都是注入的能力接口，测试可替换为伪随机实现。
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HubStore>,
    pub evaluator: Arc<dyn PromptEvaluator>,
    pub estimator: Arc<dyn DryRunEstimator>,
    pub jwt_secret: Arc<String>,
    pub token_expire_secs: u64,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}
