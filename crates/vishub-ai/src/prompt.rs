use crate::evaluator::{EvaluationInput, MentionVerdict};
use vishub_common::types::Sentiment;

/// 从站点 URL 推导站点标识（host 首段标签，去掉 www 前缀，连字符还原为空格）。
///
/// # Examples
///
/// ```
/// use vishub_ai::prompt::site_name_from_url;
///
/// assert_eq!(site_name_from_url("https://www.acme-tools.com/pricing"), "acme tools");
/// assert_eq!(site_name_from_url("not a url"), "your company");
/// ```
pub fn site_name_from_url(site_url: &str) -> String {
    let Ok(parsed) = url::Url::parse(site_url) else {
        return "your company".to_string();
    };
    let Some(host) = parsed.host_str() else {
        return "your company".to_string();
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or(host);
    if label.is_empty() {
        return "your company".to_string();
    }
    label.replace('-', " ")
}

/// 健康检查使用的固定买家意图提示词集（5 条模板）。
pub fn build_visibility_prompts(site_name: &str) -> Vec<String> {
    VISIBILITY_PROMPT_TEMPLATES
        .iter()
        .map(|t| t.replace("{{SITE}}", site_name))
        .collect()
}

const VISIBILITY_PROMPT_TEMPLATES: [&str; 5] = [
    "What are the best alternatives to {{SITE}} and how do they compare?",
    "Which companies should I shortlist if I'm evaluating {{SITE}}?",
    "Is {{SITE}} worth buying? What do customers say about it?",
    "Recommend the top providers in the {{SITE}} space for a small business.",
    "What should I know before choosing {{SITE}} over its competitors?",
];

/// 构建评估 prompt：让助手回答买家问题，并以固定标签行回报判定。
pub fn build_evaluation_prompt(input: &EvaluationInput) -> String {
    let differentiators = if input.differentiators.is_empty() {
        "N/A".to_string()
    } else {
        input.differentiators.join(", ")
    };

    EVALUATION_PROMPT
        .replace("{{PROMPT}}", &input.prompt)
        .replace("{{COMPANY}}", &input.company_name)
        .replace("{{INDUSTRY}}", &input.industry)
        .replace("{{DESCRIPTION}}", &input.description)
        .replace("{{DIFFERENTIATORS}}", &differentiators)
}

const EVALUATION_PROMPT: &str = r#"You are a buyer researching purchases with an AI assistant. Answer the following buyer question the way a helpful assistant would, recommending concrete companies or products:

{{PROMPT}}

Then determine whether the company below appears in your answer.

Company: {{COMPANY}}
Industry: {{INDUSTRY}}
Description: {{DESCRIPTION}}
Differentiators: {{DIFFERENTIATORS}}

After your answer, report the verdict as tag lines, one per line, exactly in this format:

MENTIONED:yes/no
POSITION:<list position of the company, 0 if not listed>
SENTIMENT:positive/neutral/negative
CONTEXT:<the sentence mentioning the company, or empty>
"#;

/// 从助手响应中解析提及判定。
/// 优先解析标签行；缺失时退回关键词匹配。
pub fn parse_verdict(content: &str, company_name: &str) -> MentionVerdict {
    let mut mentioned: Option<bool> = None;
    let mut position: u32 = 0;
    let mut sentiment = Sentiment::Neutral;
    let mut context = String::new();

    for line in content.lines() {
        if let Some(value) = line.strip_prefix("MENTIONED:") {
            mentioned = Some(value.trim().eq_ignore_ascii_case("yes"));
        } else if let Some(value) = line.strip_prefix("POSITION:") {
            position = value.trim().parse().unwrap_or(0);
        } else if let Some(value) = line.strip_prefix("SENTIMENT:") {
            sentiment = value.trim().to_lowercase().parse().unwrap_or(Sentiment::Neutral);
        } else if let Some(value) = line.strip_prefix("CONTEXT:") {
            context = value.trim().to_string();
        }
    }

    // 关键词回退：标签缺失时按正文是否包含公司名判定
    let mentioned = mentioned.unwrap_or_else(|| {
        content
            .to_lowercase()
            .contains(&company_name.to_lowercase())
    });

    if !mentioned {
        return MentionVerdict {
            mentioned: false,
            position: 0,
            sentiment: Sentiment::Neutral,
            context: String::new(),
        };
    }

    MentionVerdict {
        mentioned,
        position,
        sentiment,
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_name_from_url() {
        assert_eq!(site_name_from_url("https://www.acme-tools.com"), "acme tools");
        assert_eq!(site_name_from_url("https://getbrief.io/pricing"), "getbrief");
        assert_eq!(site_name_from_url("http://shop.example.co.uk"), "shop");
        assert_eq!(site_name_from_url(""), "your company");
    }

    #[test]
    fn test_build_visibility_prompts_substitutes_site() {
        let prompts = build_visibility_prompts("acme tools");
        assert_eq!(prompts.len(), 5);
        for p in &prompts {
            assert!(p.contains("acme tools"));
            assert!(!p.contains("{{SITE}}"));
        }
    }

    #[test]
    fn test_parse_verdict_from_tags() {
        let content = "Several options stand out...\n\nMENTIONED:yes\nPOSITION:3\nSENTIMENT:positive\nCONTEXT:Acme Tools is a solid pick for small teams.";
        let verdict = parse_verdict(content, "Acme Tools");
        assert!(verdict.mentioned);
        assert_eq!(verdict.position, 3);
        assert_eq!(verdict.sentiment, Sentiment::Positive);
        assert!(verdict.context.contains("solid pick"));
    }

    #[test]
    fn test_parse_verdict_not_mentioned_clears_fields() {
        let content = "Top picks are X and Y.\nMENTIONED:no\nPOSITION:2\nSENTIMENT:positive\nCONTEXT:stale";
        let verdict = parse_verdict(content, "Acme Tools");
        assert!(!verdict.mentioned);
        assert_eq!(verdict.position, 0);
        assert_eq!(verdict.sentiment, Sentiment::Neutral);
        assert!(verdict.context.is_empty());
    }

    #[test]
    fn test_parse_verdict_keyword_fallback() {
        let content = "I would recommend Acme Tools and two others.";
        let verdict = parse_verdict(content, "acme tools");
        assert!(verdict.mentioned);
        assert_eq!(verdict.position, 0);

        let absent = parse_verdict("Nothing relevant here.", "acme tools");
        assert!(!absent.mentioned);
    }
}
