use chrono::Utc;
use vishub_ai::{EvaluationInput, PromptEvaluator};
use vishub_common::types::{RecommendationStatus, Sentiment};
use vishub_storage::{HubStore, ProjectRow, RecommendationRow, TestResultRow};

/// 一次健康检查的汇总结果
#[derive(Debug, Clone, Copy)]
pub struct HealthCheckSummary {
    pub prompts_analyzed: u32,
    pub mentions_found: u32,
    pub recommendations_generated: u32,
}

/// 健康检查结果：同步完成，或（处理阶段失败后）转入后台排队语义。
#[derive(Debug, Clone, Copy)]
pub enum HealthCheckOutcome {
    Completed(HealthCheckSummary),
    Queued,
}

fn evaluation_input(project: &ProjectRow, company_name: &str, prompt: String) -> EvaluationInput {
    EvaluationInput {
        prompt,
        company_name: company_name.to_string(),
        industry: project.industry.clone().unwrap_or_default(),
        description: project.description.clone().unwrap_or_default(),
        differentiators: project.differentiators.clone(),
    }
}

fn verdict_to_row(
    project_id: &str,
    company_name: &str,
    prompt: &str,
    site_url: &str,
    verdict: &vishub_ai::MentionVerdict,
) -> TestResultRow {
    let now = Utc::now();
    TestResultRow {
        id: uuid::Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        company_name: company_name.to_string(),
        prompt: prompt.to_string(),
        mentioned: verdict.mentioned,
        rank: (verdict.position > 0).then_some(verdict.position as i32),
        sentiment: if verdict.mentioned {
            verdict.sentiment
        } else {
            Sentiment::Neutral
        },
        matched_url: verdict.mentioned.then(|| site_url.to_string()),
        last_seen: now,
        created_at: now,
    }
}

/// 对一个项目执行健康检查。
///
/// 固定 5 条买家意图提示词逐条评估（串行），每条结果无条件落一行
/// TestResult（单行写入失败只记日志，批次继续）；随后无条件写入三条
/// 推荐种子，最后刷新项目 updated_at。
///
/// 评估器在处理阶段的失败被吞掉并返回 [`HealthCheckOutcome::Queued`]，
/// 表示后台最终完成而非同步保证；已写入的行保持可见。
pub async fn run_health_check(
    store: &HubStore,
    evaluator: &dyn PromptEvaluator,
    project: &ProjectRow,
) -> HealthCheckOutcome {
    let site_name = vishub_ai::prompt::site_name_from_url(&project.site_url);
    let prompts = vishub_ai::prompt::build_visibility_prompts(&site_name);

    let mut prompts_analyzed: u32 = 0;
    let mut mentions_found: u32 = 0;

    for prompt in &prompts {
        let verdict = match evaluator
            .evaluate(evaluation_input(project, &site_name, prompt.clone()))
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::error!(
                    project_id = %project.id,
                    error = %e,
                    "Prompt evaluation failed, health check falls back to queued"
                );
                return HealthCheckOutcome::Queued;
            }
        };

        prompts_analyzed += 1;
        if verdict.mentioned {
            mentions_found += 1;
        }

        let row = verdict_to_row(&project.id, &site_name, prompt, &project.site_url, &verdict);
        if let Err(e) = store.insert_test_result(&row).await {
            // 单行失败不致命，继续写剩余结果
            tracing::error!(
                project_id = %project.id,
                error = %e,
                "Failed to persist test result, continuing batch"
            );
        }
    }

    let mut recommendations_generated: u32 = 0;
    for template in vishub_engine::health_check_seeds() {
        let row = RecommendationRow {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project.id.clone(),
            title: template.title.to_string(),
            rationale: template.rationale.to_string(),
            impact: template.impact,
            effort: template.effort,
            suggested_owner: template.suggested_owner,
            action_type: template.action_type.to_string(),
            links: vec![],
            status: RecommendationStatus::Todo,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        match store.insert_recommendation(&row).await {
            Ok(_) => recommendations_generated += 1,
            Err(e) => {
                tracing::error!(
                    project_id = %project.id,
                    error = %e,
                    "Failed to persist seed recommendation, continuing"
                );
            }
        }
    }

    if let Err(e) = store.touch_project(&project.id).await {
        tracing::error!(project_id = %project.id, error = %e, "Failed to touch project");
    }

    tracing::info!(
        project_id = %project.id,
        prompts_analyzed,
        mentions_found,
        recommendations_generated,
        "Health check completed"
    );

    HealthCheckOutcome::Completed(HealthCheckSummary {
        prompts_analyzed,
        mentions_found,
        recommendations_generated,
    })
}

/// 月度竞品复测：对项目配置的每个竞品名跑同一组提示词，
/// 结果以竞品名落在 company_name 上。不写推荐种子。
pub async fn run_competitor_retest(
    store: &HubStore,
    evaluator: &dyn PromptEvaluator,
    project: &ProjectRow,
) -> HealthCheckOutcome {
    let site_name = vishub_ai::prompt::site_name_from_url(&project.site_url);
    let prompts = vishub_ai::prompt::build_visibility_prompts(&site_name);

    let mut prompts_analyzed: u32 = 0;
    let mut mentions_found: u32 = 0;

    for competitor in &project.competitors {
        for prompt in &prompts {
            let verdict = match evaluator
                .evaluate(evaluation_input(project, competitor, prompt.clone()))
                .await
            {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::error!(
                        project_id = %project.id,
                        competitor = %competitor,
                        error = %e,
                        "Competitor evaluation failed, retest falls back to queued"
                    );
                    return HealthCheckOutcome::Queued;
                }
            };

            prompts_analyzed += 1;
            if verdict.mentioned {
                mentions_found += 1;
            }

            let row = verdict_to_row(&project.id, competitor, prompt, &project.site_url, &verdict);
            if let Err(e) = store.insert_test_result(&row).await {
                tracing::error!(
                    project_id = %project.id,
                    competitor = %competitor,
                    error = %e,
                    "Failed to persist competitor test result, continuing batch"
                );
            }
        }
    }

    if let Err(e) = store.touch_project(&project.id).await {
        tracing::error!(project_id = %project.id, error = %e, "Failed to touch project");
    }

    tracing::info!(
        project_id = %project.id,
        prompts_analyzed,
        mentions_found,
        "Competitor retest completed"
    );

    HealthCheckOutcome::Completed(HealthCheckSummary {
        prompts_analyzed,
        mentions_found,
        recommendations_generated: 0,
    })
}
