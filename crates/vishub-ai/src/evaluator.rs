use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use vishub_common::types::Sentiment;

/// 提示词评估输入：一条买家意图问题 + 被探测公司的画像
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationInput {
    /// 买家意图提示词
    pub prompt: String,
    /// 被探测的公司名（品牌或竞品）
    pub company_name: String,
    /// 所属行业
    pub industry: String,
    /// 公司一句话描述
    pub description: String,
    /// 差异化卖点
    pub differentiators: Vec<String>,
}

/// 提及判定结果
#[derive(Debug, Clone)]
pub struct MentionVerdict {
    /// 助手回答中是否提及该公司
    pub mentioned: bool,
    /// 列表排名（0 = 未上榜）
    pub position: u32,
    /// 提及的情感倾向
    pub sentiment: Sentiment,
    /// 提及上下文片段
    pub context: String,
}

/// 提示词评估器 trait（支持多模型扩展）。
///
/// 编排层只依赖该接口：真实实现调用 LLM，测试实现用伪随机打分。
#[async_trait]
pub trait PromptEvaluator: Send + Sync {
    /// 模型提供商名称
    fn provider(&self) -> &str;

    /// 评估一条买家意图提示词，判定公司是否被提及
    async fn evaluate(&self, input: EvaluationInput) -> Result<MentionVerdict>;

    /// 健康检查（可选）
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
