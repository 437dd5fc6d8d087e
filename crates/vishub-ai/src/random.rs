use crate::estimator::{DryRunEstimate, DryRunEstimator};
use crate::evaluator::{EvaluationInput, MentionVerdict, PromptEvaluator};
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use vishub_common::types::{Scope, Sentiment};

/// 伪随机评估器：约 40% 概率判定提及，排名 1–10 均匀分布。
/// 占位打分策略，用于本地开发与测试；接口与真实 Provider 完全一致。
#[derive(Clone)]
pub struct RandomEvaluator {
    mention_probability: f64,
}

impl RandomEvaluator {
    pub fn new(mention_probability: f64) -> Self {
        Self {
            mention_probability,
        }
    }
}

impl Default for RandomEvaluator {
    fn default() -> Self {
        Self::new(0.4)
    }
}

#[async_trait]
impl PromptEvaluator for RandomEvaluator {
    fn provider(&self) -> &str {
        "random"
    }

    async fn evaluate(&self, input: EvaluationInput) -> Result<MentionVerdict> {
        let (mentioned, position, sentiment) = {
            let mut rng = rand::thread_rng();
            let mentioned = rng.gen_bool(self.mention_probability);
            let position = if mentioned { rng.gen_range(1..=10) } else { 0 };
            let sentiment = match rng.gen_range(0..10) {
                0..=4 => Sentiment::Positive,
                5..=7 => Sentiment::Neutral,
                _ => Sentiment::Negative,
            };
            (mentioned, position, sentiment)
        };

        let context = if mentioned {
            format!(
                "{} was recommended as a strong option for \"{}\".",
                input.company_name, input.prompt
            )
        } else {
            String::new()
        };

        Ok(MentionVerdict {
            mentioned,
            position,
            sentiment: if mentioned { sentiment } else { Sentiment::Neutral },
            context,
        })
    }
}

/// 伪随机试运行估算器：estimatedChanges 取 5..=24。
#[derive(Clone, Default)]
pub struct RandomEstimator;

#[async_trait]
impl DryRunEstimator for RandomEstimator {
    async fn estimate(&self, scopes: &[Scope]) -> Result<DryRunEstimate> {
        let estimated_changes = {
            let mut rng = rand::thread_rng();
            rng.gen_range(5..25)
        };
        Ok(DryRunEstimate {
            can_apply_fixes: true,
            potential_fixes: scopes.len(),
            estimated_changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> EvaluationInput {
        EvaluationInput {
            prompt: "best CRM for startups".to_string(),
            company_name: "Acme CRM".to_string(),
            industry: "SaaS".to_string(),
            description: "A lightweight CRM".to_string(),
            differentiators: vec!["fast setup".to_string()],
        }
    }

    #[tokio::test]
    async fn always_mentioned_when_probability_is_one() {
        let evaluator = RandomEvaluator::new(1.0);
        for _ in 0..20 {
            let verdict = evaluator.evaluate(sample_input()).await.unwrap();
            assert!(verdict.mentioned);
            assert!((1..=10).contains(&verdict.position));
            assert!(verdict.context.contains("Acme CRM"));
        }
    }

    #[tokio::test]
    async fn never_mentioned_when_probability_is_zero() {
        let evaluator = RandomEvaluator::new(0.0);
        for _ in 0..20 {
            let verdict = evaluator.evaluate(sample_input()).await.unwrap();
            assert!(!verdict.mentioned);
            assert_eq!(verdict.position, 0);
            assert!(verdict.context.is_empty());
        }
    }

    #[tokio::test]
    async fn estimate_stays_in_documented_range() {
        let estimator = RandomEstimator;
        let scopes = [Scope::Meta, Scope::H1, Scope::AltText];
        for _ in 0..50 {
            let estimate = estimator.estimate(&scopes).await.unwrap();
            assert!(estimate.can_apply_fixes);
            assert_eq!(estimate.potential_fixes, 3);
            assert!((5..=24).contains(&estimate.estimated_changes));
        }
    }
}
