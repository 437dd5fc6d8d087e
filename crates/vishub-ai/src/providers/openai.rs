use crate::evaluator::{EvaluationInput, MentionVerdict, PromptEvaluator};
use crate::models::{ChatMessage, ChatRequest, ChatResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// OpenAI 兼容 Provider（chat/completions 协议）
#[derive(Clone)]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
        max_tokens: Option<usize>,
        temperature: Option<f32>,
    ) -> Result<Self> {
        let timeout = timeout_secs.unwrap_or(120);
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            client,
            max_tokens,
            temperature,
        })
    }

    async fn call_api(&self, prompt: &str) -> Result<String> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You simulate how an AI shopping assistant answers buyer questions, then report a structured mention verdict.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            prompt_length = prompt.len(),
            "Calling chat completions API"
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&req)
            .send()
            .await
            .context("Failed to send request to chat completions API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Chat completions request failed"
            );
            anyhow::bail!("Chat completions API error {}: {}", status, body);
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        tracing::debug!(
            usage = ?chat_resp.usage,
            "Chat completions response received"
        );

        chat_resp
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("Empty response from chat completions API"))
    }
}

#[async_trait]
impl PromptEvaluator for OpenAiProvider {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn evaluate(&self, input: EvaluationInput) -> Result<MentionVerdict> {
        let prompt = crate::prompt::build_evaluation_prompt(&input);
        let response = self.call_api(&prompt).await?;
        Ok(crate::prompt::parse_verdict(&response, &input.company_name))
    }

    async fn health_check(&self) -> Result<()> {
        // 轻量探活：仅校验凭据非空，不额外消耗配额
        if self.api_key.is_empty() {
            anyhow::bail!("API key is not configured");
        }
        Ok(())
    }
}
