use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
};

use crate::entities::schedule_flag::{self, Column as FlagCol, Entity as FlagEntity};
use crate::store::HubStore;

/// 周期任务开关数据行（每项目一行，upsert 语义）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleFlagRow {
    pub id: String,
    pub project_id: String,
    pub weekly_health_check: bool,
    pub monthly_competitor_retest: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn model_to_flags(m: schedule_flag::Model) -> ScheduleFlagRow {
    ScheduleFlagRow {
        id: m.id,
        project_id: m.project_id,
        weekly_health_check: m.weekly_health_check,
        monthly_competitor_retest: m.monthly_competitor_retest,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl HubStore {
    /// Upsert：None 字段保持原值；首次写入时缺省为 false。
    pub async fn upsert_schedule_flags(
        &self,
        project_id: &str,
        weekly_health_check: Option<bool>,
        monthly_competitor_retest: Option<bool>,
    ) -> Result<ScheduleFlagRow> {
        let now = Utc::now().fixed_offset();
        let existing = FlagEntity::find()
            .filter(FlagCol::ProjectId.eq(project_id))
            .one(self.db())
            .await?;

        let m = match existing {
            Some(m) => {
                let weekly = weekly_health_check.unwrap_or(m.weekly_health_check);
                let monthly = monthly_competitor_retest.unwrap_or(m.monthly_competitor_retest);
                let mut am = m.into_active_model();
                am.weekly_health_check = Set(weekly);
                am.monthly_competitor_retest = Set(monthly);
                am.updated_at = Set(now);
                am.update(self.db()).await?
            }
            None => {
                let am = schedule_flag::ActiveModel {
                    id: Set(uuid::Uuid::new_v4().to_string()),
                    project_id: Set(project_id.to_string()),
                    weekly_health_check: Set(weekly_health_check.unwrap_or(false)),
                    monthly_competitor_retest: Set(monthly_competitor_retest.unwrap_or(false)),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                am.insert(self.db()).await?
            }
        };
        Ok(model_to_flags(m))
    }

    pub async fn get_schedule_flags(&self, project_id: &str) -> Result<Option<ScheduleFlagRow>> {
        let m = FlagEntity::find()
            .filter(FlagCol::ProjectId.eq(project_id))
            .one(self.db())
            .await?;
        Ok(m.map(model_to_flags))
    }

    /// 周检启用的所有项目（批处理入口）。
    pub async fn list_weekly_enabled(&self) -> Result<Vec<ScheduleFlagRow>> {
        let rows = FlagEntity::find()
            .filter(FlagCol::WeeklyHealthCheck.eq(true))
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_flags).collect())
    }

    /// 月度竞品复测启用的所有项目。
    pub async fn list_monthly_enabled(&self) -> Result<Vec<ScheduleFlagRow>> {
        let rows = FlagEntity::find()
            .filter(FlagCol::MonthlyCompetitorRetest.eq(true))
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_flags).collect())
    }
}
