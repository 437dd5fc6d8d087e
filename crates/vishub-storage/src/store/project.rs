use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel, Order,
    QueryFilter, QueryOrder,
};
use vishub_common::types::{Scope, SiteScriptStatus};

use crate::entities::project::{self, Column as ProjCol, Entity as ProjEntity};
use crate::store::HubStore;

/// 项目数据行。cms_credentials 不在行内暴露，
/// 仅通过 [`HubStore::get_cms_credentials`] 解密读取。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    pub user_id: String,
    pub site_url: String,
    pub cms_provider: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub differentiators: Vec<String>,
    pub competitors: Vec<String>,
    pub autopilot_enabled: bool,
    pub autopilot_scopes: Vec<Scope>,
    pub site_script_status: SiteScriptStatus,
    pub has_cms_credentials: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建项目请求（onboarding）
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: String,
    pub site_url: String,
    pub cms_provider: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub differentiators: Vec<String>,
    pub competitors: Vec<String>,
    pub cms_credentials: Option<String>,
}

fn parse_scopes(json: &str) -> Vec<Scope> {
    serde_json::from_str::<Vec<Scope>>(json).unwrap_or_default()
}

fn model_to_project(m: project::Model) -> ProjectRow {
    ProjectRow {
        id: m.id,
        user_id: m.user_id,
        site_url: m.site_url,
        cms_provider: m.cms_provider,
        industry: m.industry,
        description: m.description,
        differentiators: serde_json::from_str(&m.differentiators_json).unwrap_or_default(),
        competitors: serde_json::from_str(&m.competitors_json).unwrap_or_default(),
        autopilot_enabled: m.autopilot_enabled,
        autopilot_scopes: parse_scopes(&m.autopilot_scopes_json),
        site_script_status: m
            .site_script_status
            .parse()
            .unwrap_or(SiteScriptStatus::Missing),
        has_cms_credentials: m.cms_credentials_enc.is_some(),
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl HubStore {
    pub async fn insert_project(&self, req: &NewProject) -> Result<ProjectRow> {
        let now = Utc::now().fixed_offset();
        let credentials_enc = match &req.cms_credentials {
            Some(plain) => Some(self.credential_encryptor.encrypt(plain)?),
            None => None,
        };
        let am = project::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(req.user_id.clone()),
            site_url: Set(req.site_url.clone()),
            cms_provider: Set(req.cms_provider.clone()),
            industry: Set(req.industry.clone()),
            description: Set(req.description.clone()),
            differentiators_json: Set(serde_json::to_string(&req.differentiators)?),
            competitors_json: Set(serde_json::to_string(&req.competitors)?),
            autopilot_enabled: Set(false),
            autopilot_scopes_json: Set("[]".to_string()),
            site_script_status: Set(SiteScriptStatus::Missing.as_str().to_string()),
            cms_credentials_enc: Set(credentials_enc),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let m = am.insert(self.db()).await?;
        Ok(model_to_project(m))
    }

    pub async fn get_project(&self, id: &str) -> Result<Option<ProjectRow>> {
        let m = ProjEntity::find_by_id(id).one(self.db()).await?;
        Ok(m.map(model_to_project))
    }

    /// 按所有者过滤查询项目。行级租户隔离的唯一入口：
    /// 不属于该用户的项目与不存在的项目返回同样的 None。
    pub async fn get_project_for_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<ProjectRow>> {
        let m = ProjEntity::find_by_id(id)
            .filter(ProjCol::UserId.eq(user_id))
            .one(self.db())
            .await?;
        Ok(m.map(model_to_project))
    }

    pub async fn list_projects_for_user(&self, user_id: &str) -> Result<Vec<ProjectRow>> {
        let rows = ProjEntity::find()
            .filter(ProjCol::UserId.eq(user_id))
            .order_by(ProjCol::CreatedAt, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_project).collect())
    }

    /// 持久化 autopilot 开关与作用域集合，并刷新 updated_at。
    pub async fn set_autopilot(
        &self,
        id: &str,
        enabled: bool,
        scopes: &[Scope],
    ) -> Result<Option<ProjectRow>> {
        let Some(m) = ProjEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };
        let mut am = m.into_active_model();
        am.autopilot_enabled = Set(enabled);
        am.autopilot_scopes_json = Set(serde_json::to_string(scopes)?);
        am.updated_at = Set(Utc::now().fixed_offset());
        let m = am.update(self.db()).await?;
        Ok(Some(model_to_project(m)))
    }

    pub async fn set_site_script_status(
        &self,
        id: &str,
        status: SiteScriptStatus,
    ) -> Result<Option<ProjectRow>> {
        let Some(m) = ProjEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };
        let mut am = m.into_active_model();
        am.site_script_status = Set(status.as_str().to_string());
        am.updated_at = Set(Utc::now().fixed_offset());
        let m = am.update(self.db()).await?;
        Ok(Some(model_to_project(m)))
    }

    /// 刷新 updated_at（健康检查完成后调用）。
    pub async fn touch_project(&self, id: &str) -> Result<()> {
        let Some(m) = ProjEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(());
        };
        let mut am = m.into_active_model();
        am.updated_at = Set(Utc::now().fixed_offset());
        am.update(self.db()).await?;
        Ok(())
    }

    /// 解密读取项目的 CMS 凭据（未配置时返回 None）。
    pub async fn get_cms_credentials(&self, id: &str) -> Result<Option<String>> {
        let Some(m) = ProjEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };
        match m.cms_credentials_enc {
            Some(enc) => Ok(Some(self.credential_encryptor.decrypt(&enc)?)),
            None => Ok(None),
        }
    }
}
