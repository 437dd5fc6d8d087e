use crate::healthcheck::runner;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use vishub_ai::PromptEvaluator;
use vishub_storage::HubStore;

/// 周期任务调度器：周检与月度竞品复测。
/// 每个 tick 扫描 schedule_flags，对到期项目逐个执行，
/// 单项目失败只记日志，不影响本轮其余项目。
pub struct ScheduleRunner {
    store: Arc<HubStore>,
    evaluator: Arc<dyn PromptEvaluator>,
    tick_secs: u64,
    weekly_interval_secs: u64,
    monthly_interval_secs: u64,
}

impl ScheduleRunner {
    pub fn new(
        store: Arc<HubStore>,
        evaluator: Arc<dyn PromptEvaluator>,
        tick_secs: u64,
        weekly_interval_secs: u64,
        monthly_interval_secs: u64,
    ) -> Self {
        Self {
            store,
            evaluator,
            tick_secs,
            weekly_interval_secs,
            monthly_interval_secs,
        }
    }

    pub async fn run(&self) {
        tracing::info!(
            tick_secs = self.tick_secs,
            weekly_interval = self.weekly_interval_secs,
            monthly_interval = self.monthly_interval_secs,
            "Schedule runner started"
        );

        let mut tick = interval(Duration::from_secs(self.tick_secs));
        loop {
            tick.tick().await;
            if let Err(e) = self.run_weekly_pass().await {
                tracing::error!(error = %e, "Weekly health check pass failed");
            }
            if let Err(e) = self.run_monthly_pass().await {
                tracing::error!(error = %e, "Monthly competitor retest pass failed");
            }
        }
    }

    async fn run_weekly_pass(&self) -> anyhow::Result<()> {
        let flags = self.store.list_weekly_enabled().await?;
        if flags.is_empty() {
            return Ok(());
        }

        for flag in flags {
            let project = match self.store.get_project(&flag.project_id).await {
                Ok(Some(project)) => project,
                Ok(None) => {
                    tracing::warn!(project_id = %flag.project_id, "Scheduled project no longer exists");
                    continue;
                }
                Err(e) => {
                    tracing::error!(project_id = %flag.project_id, error = %e, "Failed to load scheduled project");
                    continue;
                }
            };

            if !self.weekly_due(&project.id).await {
                continue;
            }

            tracing::info!(project_id = %project.id, "Weekly health check due");
            runner::run_health_check(&self.store, self.evaluator.as_ref(), &project).await;
        }
        Ok(())
    }

    /// 到期判定：最近一次结果早于周期间隔，或从未检查过。
    async fn weekly_due(&self, project_id: &str) -> bool {
        match self.store.latest_result_at(project_id).await {
            Ok(Some(last)) => {
                Utc::now() - last >= ChronoDuration::seconds(self.weekly_interval_secs as i64)
            }
            Ok(None) => true,
            Err(e) => {
                tracing::error!(project_id = %project_id, error = %e, "Failed to query latest result");
                false
            }
        }
    }

    async fn run_monthly_pass(&self) -> anyhow::Result<()> {
        let flags = self.store.list_monthly_enabled().await?;
        if flags.is_empty() {
            return Ok(());
        }

        for flag in flags {
            let project = match self.store.get_project(&flag.project_id).await {
                Ok(Some(project)) => project,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(project_id = %flag.project_id, error = %e, "Failed to load scheduled project");
                    continue;
                }
            };

            if project.competitors.is_empty() {
                tracing::debug!(project_id = %project.id, "No competitors configured, skipping retest");
                continue;
            }

            if !self.monthly_due(&project).await {
                continue;
            }

            tracing::info!(
                project_id = %project.id,
                competitors = project.competitors.len(),
                "Monthly competitor retest due"
            );
            runner::run_competitor_retest(&self.store, self.evaluator.as_ref(), &project).await;
        }
        Ok(())
    }

    async fn monthly_due(&self, project: &vishub_storage::ProjectRow) -> bool {
        let brand = vishub_ai::prompt::site_name_from_url(&project.site_url);
        match self
            .store
            .latest_competitor_result_at(&project.id, &brand)
            .await
        {
            Ok(Some(last)) => {
                Utc::now() - last >= ChronoDuration::seconds(self.monthly_interval_secs as i64)
            }
            Ok(None) => true,
            Err(e) => {
                tracing::error!(project_id = %project.id, error = %e, "Failed to query latest competitor result");
                false
            }
        }
    }
}
