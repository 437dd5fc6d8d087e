use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel, Order,
    QueryFilter, QueryOrder,
};
use vishub_common::types::{Effort, Impact, Owner, RecommendationStatus};

use crate::entities::recommendation::{self, Column as RecCol, Entity as RecEntity};
use crate::store::HubStore;

/// 推荐项数据行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub rationale: String,
    pub impact: Impact,
    pub effort: Effort,
    pub suggested_owner: Owner,
    pub action_type: String,
    pub links: Vec<String>,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn model_to_recommendation(m: recommendation::Model) -> RecommendationRow {
    RecommendationRow {
        id: m.id,
        project_id: m.project_id,
        title: m.title,
        rationale: m.rationale,
        impact: m.impact.parse().unwrap_or(Impact::Medium),
        effort: m.effort.parse().unwrap_or(Effort::Medium),
        suggested_owner: m.suggested_owner.parse().unwrap_or(Owner::Content),
        action_type: m.action_type,
        links: serde_json::from_str(&m.links_json).unwrap_or_default(),
        status: m.status.parse().unwrap_or(RecommendationStatus::Todo),
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl HubStore {
    pub async fn insert_recommendation(
        &self,
        row: &RecommendationRow,
    ) -> Result<RecommendationRow> {
        let now = Utc::now().fixed_offset();
        let am = recommendation::ActiveModel {
            id: Set(row.id.clone()),
            project_id: Set(row.project_id.clone()),
            title: Set(row.title.clone()),
            rationale: Set(row.rationale.clone()),
            impact: Set(row.impact.as_str().to_string()),
            effort: Set(row.effort.as_str().to_string()),
            suggested_owner: Set(row.suggested_owner.as_str().to_string()),
            action_type: Set(row.action_type.clone()),
            links_json: Set(serde_json::to_string(&row.links)?),
            status: Set(row.status.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let m = am.insert(self.db()).await?;
        Ok(model_to_recommendation(m))
    }

    /// 待办推荐项，按插入顺序（created_at 升序）返回。
    /// 影响/成本排序属于推荐引擎的纯逻辑，不在查询层做。
    pub async fn list_todo_recommendations(
        &self,
        project_id: &str,
    ) -> Result<Vec<RecommendationRow>> {
        let rows = RecEntity::find()
            .filter(RecCol::ProjectId.eq(project_id))
            .filter(RecCol::Status.eq(RecommendationStatus::Todo.as_str()))
            .order_by(RecCol::CreatedAt, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_recommendation).collect())
    }

    /// 状态流转（todo → in_progress → done）。project_id 过滤承担所有权校验。
    pub async fn set_recommendation_status(
        &self,
        id: &str,
        project_id: &str,
        status: RecommendationStatus,
    ) -> Result<Option<RecommendationRow>> {
        let Some(m) = RecEntity::find_by_id(id)
            .filter(RecCol::ProjectId.eq(project_id))
            .one(self.db())
            .await?
        else {
            return Ok(None);
        };
        let mut am = m.into_active_model();
        am.status = Set(status.as_str().to_string());
        am.updated_at = Set(Utc::now().fixed_offset());
        let m = am.update(self.db()).await?;
        Ok(Some(model_to_recommendation(m)))
    }
}
