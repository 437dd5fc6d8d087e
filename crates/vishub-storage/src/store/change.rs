use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use vishub_common::types::{ChangeJobStatus, ChangeSource, Scope};

use crate::entities::change_job::{self, Column as JobCol, Entity as JobEntity};
use crate::entities::change_log_entry::{self, Column as LogCol, Entity as LogEntity};
use crate::store::HubStore;

/// 变更任务数据行（一个作用域一批修复）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeJobRow {
    pub id: String,
    pub project_id: String,
    pub scope: Scope,
    pub description: String,
    pub pages: Vec<String>,
    pub fix_count: i32,
    pub status: ChangeJobStatus,
    pub applied_at: Option<DateTime<Utc>>,
    pub rollback_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 变更审计记录，与成功的 ChangeJob 一一对应。只追加，不可变更。
/// scope 保留原始字符串：审计行按写入时的值原样展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogRow {
    pub id: String,
    pub project_id: String,
    pub scope: String,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
    pub source: ChangeSource,
    pub applied_by: String,
    pub applied_at: DateTime<Utc>,
    pub rollback_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn model_to_log(m: change_log_entry::Model) -> ChangeLogRow {
    ChangeLogRow {
        id: m.id,
        project_id: m.project_id,
        scope: m.scope,
        before: serde_json::from_str(&m.before_json).unwrap_or(serde_json::Value::Null),
        after: serde_json::from_str(&m.after_json).unwrap_or(serde_json::Value::Null),
        source: m.source.parse().unwrap_or(ChangeSource::Autopilot),
        applied_by: m.applied_by,
        applied_at: m.applied_at.with_timezone(&Utc),
        rollback_token: m.rollback_token,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

impl HubStore {
    pub async fn insert_change_job(&self, row: &ChangeJobRow) -> Result<ChangeJobRow> {
        let am = change_job::ActiveModel {
            id: Set(row.id.clone()),
            project_id: Set(row.project_id.clone()),
            scope: Set(row.scope.as_str().to_string()),
            description: Set(row.description.clone()),
            pages_json: Set(serde_json::to_string(&row.pages)?),
            fix_count: Set(row.fix_count),
            status: Set(row.status.as_str().to_string()),
            applied_at: Set(row.applied_at.map(|t| t.fixed_offset())),
            rollback_token: Set(row.rollback_token.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };
        let m = am.insert(self.db()).await?;
        Ok(ChangeJobRow {
            id: m.id,
            project_id: m.project_id,
            scope: m.scope.parse().unwrap_or(row.scope),
            description: m.description,
            pages: serde_json::from_str(&m.pages_json).unwrap_or_default(),
            fix_count: m.fix_count,
            status: m.status.parse().unwrap_or(ChangeJobStatus::Queued),
            applied_at: m.applied_at.map(|t| t.with_timezone(&Utc)),
            rollback_token: m.rollback_token,
            created_at: m.created_at.with_timezone(&Utc),
        })
    }

    pub async fn insert_change_log(&self, row: &ChangeLogRow) -> Result<ChangeLogRow> {
        let am = change_log_entry::ActiveModel {
            id: Set(row.id.clone()),
            project_id: Set(row.project_id.clone()),
            scope: Set(row.scope.clone()),
            before_json: Set(row.before.to_string()),
            after_json: Set(row.after.to_string()),
            source: Set(row.source.as_str().to_string()),
            applied_by: Set(row.applied_by.clone()),
            applied_at: Set(row.applied_at.fixed_offset()),
            rollback_token: Set(row.rollback_token.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };
        let m = am.insert(self.db()).await?;
        Ok(model_to_log(m))
    }

    /// 速率限制窗口检查：`since` 之后该项目创建的变更任务数。
    pub async fn count_change_jobs_since(
        &self,
        project_id: &str,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        Ok(JobEntity::find()
            .filter(JobCol::ProjectId.eq(project_id))
            .filter(JobCol::CreatedAt.gte(since.fixed_offset()))
            .count(self.db())
            .await?)
    }

    /// 审计记录，按 applied_at 倒序。
    pub async fn list_change_log(
        &self,
        project_id: &str,
        limit: usize,
    ) -> Result<Vec<ChangeLogRow>> {
        let rows = LogEntity::find()
            .filter(LogCol::ProjectId.eq(project_id))
            .order_by(LogCol::AppliedAt, Order::Desc)
            .limit(limit as u64)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_log).collect())
    }

    pub async fn count_change_log(&self, project_id: &str) -> Result<u64> {
        Ok(LogEntity::find()
            .filter(LogCol::ProjectId.eq(project_id))
            .count(self.db())
            .await?)
    }
}
