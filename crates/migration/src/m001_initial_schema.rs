use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按依赖顺序建表
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await?;
        Ok(())
    }
}

const UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    token_version INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL,
    site_url TEXT NOT NULL,
    cms_provider TEXT,
    industry TEXT,
    description TEXT,
    differentiators_json TEXT NOT NULL DEFAULT '[]',
    competitors_json TEXT NOT NULL DEFAULT '[]',
    autopilot_enabled INTEGER NOT NULL DEFAULT 0,
    autopilot_scopes_json TEXT NOT NULL DEFAULT '[]',
    site_script_status TEXT NOT NULL DEFAULT 'missing',
    cms_credentials_enc TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_user_id ON projects(user_id);

CREATE TABLE IF NOT EXISTS test_results (
    id TEXT PRIMARY KEY NOT NULL,
    project_id TEXT NOT NULL,
    company_name TEXT NOT NULL,
    prompt TEXT NOT NULL,
    mentioned INTEGER NOT NULL DEFAULT 0,
    rank INTEGER,
    sentiment TEXT NOT NULL DEFAULT 'neutral',
    matched_url TEXT,
    last_seen TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_test_results_project_id ON test_results(project_id);
CREATE INDEX IF NOT EXISTS idx_test_results_last_seen ON test_results(last_seen DESC);

CREATE TABLE IF NOT EXISTS recommendations (
    id TEXT PRIMARY KEY NOT NULL,
    project_id TEXT NOT NULL,
    title TEXT NOT NULL,
    rationale TEXT NOT NULL,
    impact TEXT NOT NULL,
    effort TEXT NOT NULL,
    suggested_owner TEXT NOT NULL,
    action_type TEXT NOT NULL,
    links_json TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL DEFAULT 'todo',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_recommendations_project_id ON recommendations(project_id);
CREATE INDEX IF NOT EXISTS idx_recommendations_status ON recommendations(status);

CREATE TABLE IF NOT EXISTS change_jobs (
    id TEXT PRIMARY KEY NOT NULL,
    project_id TEXT NOT NULL,
    scope TEXT NOT NULL,
    description TEXT NOT NULL,
    pages_json TEXT NOT NULL DEFAULT '[]',
    fix_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'queued',
    applied_at TEXT,
    rollback_token TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_change_jobs_project_id ON change_jobs(project_id);
CREATE INDEX IF NOT EXISTS idx_change_jobs_created_at ON change_jobs(created_at DESC);

CREATE TABLE IF NOT EXISTS change_log (
    id TEXT PRIMARY KEY NOT NULL,
    project_id TEXT NOT NULL,
    scope TEXT NOT NULL,
    before_json TEXT NOT NULL DEFAULT '{}',
    after_json TEXT NOT NULL DEFAULT '{}',
    source TEXT NOT NULL DEFAULT 'autopilot',
    applied_by TEXT NOT NULL,
    applied_at TEXT NOT NULL,
    rollback_token TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_change_log_project_id ON change_log(project_id);
CREATE INDEX IF NOT EXISTS idx_change_log_applied_at ON change_log(applied_at DESC);

CREATE TABLE IF NOT EXISTS schedule_flags (
    id TEXT PRIMARY KEY NOT NULL,
    project_id TEXT NOT NULL UNIQUE,
    weekly_health_check INTEGER NOT NULL DEFAULT 0,
    monthly_competitor_retest INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS schedule_flags;
DROP TABLE IF EXISTS change_log;
DROP TABLE IF EXISTS change_jobs;
DROP TABLE IF EXISTS recommendations;
DROP TABLE IF EXISTS test_results;
DROP TABLE IF EXISTS projects;
DROP TABLE IF EXISTS users;
";
