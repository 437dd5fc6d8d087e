use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter,
};

use crate::entities::user::{self, Column as UserCol, Entity as UserEntity};
use crate::store::HubStore;

/// 用户数据行
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub token_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn model_to_user(m: user::Model) -> UserRow {
    UserRow {
        id: m.id,
        username: m.username,
        password_hash: m.password_hash,
        token_version: m.token_version,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl HubStore {
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRow> {
        let now = Utc::now().fixed_offset();
        let am = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            token_version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let m = am.insert(self.db()).await?;
        Ok(model_to_user(m))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let m = UserEntity::find()
            .filter(UserCol::Username.eq(username))
            .one(self.db())
            .await?;
        Ok(m.map(model_to_user))
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        let m = UserEntity::find_by_id(id).one(self.db()).await?;
        Ok(m.map(model_to_user))
    }

    pub async fn count_users(&self) -> Result<u64> {
        Ok(UserEntity::find().count(self.db()).await?)
    }

    /// 更新密码并递增 token_version，使已签发的 JWT 全部失效。
    pub async fn update_password(&self, id: &str, new_hash: &str) -> Result<bool> {
        let Some(m) = UserEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(false);
        };
        let version = m.token_version;
        let mut am = m.into_active_model();
        am.password_hash = Set(new_hash.to_string());
        am.token_version = Set(version + 1);
        am.updated_at = Set(Utc::now().fixed_offset());
        am.update(self.db()).await?;
        Ok(true)
    }
}
