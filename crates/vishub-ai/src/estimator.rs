use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use vishub_common::types::Scope;

/// Autopilot 试运行估算结果。
/// estimatedChanges 是估算值而非保证值，调用方按此展示即可。
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DryRunEstimate {
    pub can_apply_fixes: bool,
    pub potential_fixes: usize,
    pub estimated_changes: u32,
}

/// 试运行估算器 trait。
/// 真实实现应扫描站点内容；占位实现返回随机估算。
#[async_trait]
pub trait DryRunEstimator: Send + Sync {
    async fn estimate(&self, scopes: &[Scope]) -> Result<DryRunEstimate>;
}
