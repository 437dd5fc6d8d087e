use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use std::path::Path;

use crate::auth::CredentialEncryptor;

pub mod change;
pub mod project;
pub mod recommendation;
pub mod schedule;
pub mod test_result;
pub mod user;

/// 业务数据库（vishub.db）的统一访问层。
///
/// 所有方法均为 `async fn`，底层使用 SeaORM + SQLite。
/// 每类记录一个子模块（project / test_result / recommendation / change /
/// schedule / user），Row 类型与查询方法定义在各自模块内。
pub struct HubStore {
    pub(crate) db: DatabaseConnection,
    pub(crate) credential_encryptor: CredentialEncryptor,
}

impl HubStore {
    /// 连接并初始化业务数据库。
    ///
    /// - `db_url`：完整的数据库连接 URL，由调用方（服务器配置）提供。
    ///   SQLite 示例：`sqlite:///data/vishub.db?mode=rwc`
    /// - `data_dir`：本地数据目录，用于存放 CMS 凭据加密密钥文件。
    ///
    /// 自动运行 `sea-orm-migration` 迁移，确保 Schema 最新。
    pub async fn new(db_url: &str, data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let db = Database::connect(db_url).await?;

        // WAL 模式仅对 SQLite 文件库有效
        if db_url.starts_with("sqlite://") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        // 运行所有待执行迁移
        Migrator::up(&db, None).await?;

        let credential_encryptor = CredentialEncryptor::load_or_create(data_dir)?;
        tracing::info!(db_url = %db_url, "Initialized hub store (SeaORM)");

        Ok(Self {
            db,
            credential_encryptor,
        })
    }

    /// 返回底层数据库连接引用（供子模块使用）。
    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
