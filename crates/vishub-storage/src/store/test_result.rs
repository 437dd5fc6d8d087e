use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use vishub_common::types::Sentiment;

use crate::entities::test_result::{self, Column as ResCol, Entity as ResEntity};
use crate::store::HubStore;

/// 提示词测试结果数据行（只追加的时间序列）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultRow {
    pub id: String,
    pub project_id: String,
    pub company_name: String,
    pub prompt: String,
    pub mentioned: bool,
    pub rank: Option<i32>,
    pub sentiment: Sentiment,
    pub matched_url: Option<String>,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

fn model_to_result(m: test_result::Model) -> TestResultRow {
    TestResultRow {
        id: m.id,
        project_id: m.project_id,
        company_name: m.company_name,
        prompt: m.prompt,
        mentioned: m.mentioned,
        rank: m.rank,
        sentiment: m.sentiment.parse().unwrap_or(Sentiment::Neutral),
        matched_url: m.matched_url,
        last_seen: m.last_seen.with_timezone(&Utc),
        created_at: m.created_at.with_timezone(&Utc),
    }
}

impl HubStore {
    pub async fn insert_test_result(&self, row: &TestResultRow) -> Result<TestResultRow> {
        let am = test_result::ActiveModel {
            id: Set(row.id.clone()),
            project_id: Set(row.project_id.clone()),
            company_name: Set(row.company_name.clone()),
            prompt: Set(row.prompt.clone()),
            mentioned: Set(row.mentioned),
            rank: Set(row.rank),
            sentiment: Set(row.sentiment.as_str().to_string()),
            matched_url: Set(row.matched_url.clone()),
            last_seen: Set(row.last_seen.fixed_offset()),
            created_at: Set(Utc::now().fixed_offset()),
        };
        let m = am.insert(self.db()).await?;
        Ok(model_to_result(m))
    }

    /// 查询「wins」：被提及且有排名的结果，`last_seen >= since`，
    /// 按排名升序（名次越靠前越好）。
    pub async fn list_wins(
        &self,
        project_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TestResultRow>> {
        let rows = ResEntity::find()
            .filter(ResCol::ProjectId.eq(project_id))
            .filter(ResCol::Mentioned.eq(true))
            .filter(ResCol::Rank.is_not_null())
            .filter(ResCol::Rank.gt(0))
            .filter(ResCol::LastSeen.gte(since.fixed_offset()))
            .order_by(ResCol::Rank, Order::Asc)
            .limit(limit as u64)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_result).collect())
    }

    pub async fn count_wins(&self, project_id: &str, since: DateTime<Utc>) -> Result<u64> {
        Ok(ResEntity::find()
            .filter(ResCol::ProjectId.eq(project_id))
            .filter(ResCol::Mentioned.eq(true))
            .filter(ResCol::Rank.is_not_null())
            .filter(ResCol::Rank.gt(0))
            .filter(ResCol::LastSeen.gte(since.fixed_offset()))
            .count(self.db())
            .await?)
    }

    /// 该项目最近一次测试结果时间（调度器用于判断周检是否到期）。
    pub async fn latest_result_at(&self, project_id: &str) -> Result<Option<DateTime<Utc>>> {
        let m = ResEntity::find()
            .filter(ResCol::ProjectId.eq(project_id))
            .order_by(ResCol::LastSeen, Order::Desc)
            .one(self.db())
            .await?;
        Ok(m.map(|m| m.last_seen.with_timezone(&Utc)))
    }

    /// 该项目最近一次竞品测试结果时间（company_name 不等于品牌名）。
    pub async fn latest_competitor_result_at(
        &self,
        project_id: &str,
        brand: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let m = ResEntity::find()
            .filter(ResCol::ProjectId.eq(project_id))
            .filter(ResCol::CompanyName.ne(brand))
            .order_by(ResCol::LastSeen, Order::Desc)
            .one(self.db())
            .await?;
        Ok(m.map(|m| m.last_seen.with_timezone(&Utc)))
    }
}
