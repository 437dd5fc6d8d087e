use vishub_common::types::{Effort, Impact, Owner};

/// 内置推荐模板（默认目录与健康检查种子共用的形态）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationTemplate {
    pub title: &'static str,
    pub rationale: &'static str,
    pub impact: Impact,
    pub effort: Effort,
    pub suggested_owner: Owner,
    pub action_type: &'static str,
}

/// Top-N 选择结果：库存候选或默认目录补位项。
#[derive(Debug, Clone)]
pub enum TopPick<T> {
    Stored(T),
    Default(&'static RecommendationTemplate),
}

/// 默认推荐目录。候选不足 N 时按此固定顺序补位。
const DEFAULT_CATALOG: [RecommendationTemplate; 3] = [
    RecommendationTemplate {
        title: "Create location-specific content",
        rationale: "AI assistants favor businesses with clear geographic signals when answering local buyer questions",
        impact: Impact::Medium,
        effort: Effort::Medium,
        suggested_owner: Owner::Content,
        action_type: "location_content",
    },
    RecommendationTemplate {
        title: "Engage in industry forums",
        rationale: "Mentions in community discussions feed the sources assistants cite for recommendations",
        impact: Impact::Medium,
        effort: Effort::Low,
        suggested_owner: Owner::PR,
        action_type: "community_engagement",
    },
    RecommendationTemplate {
        title: "Monitor competitor mentions",
        rationale: "Knowing where competitors appear reveals which prompts are worth targeting next",
        impact: Impact::Low,
        effort: Effort::Low,
        suggested_owner: Owner::Content,
        action_type: "competitor_monitoring",
    },
];

/// 健康检查每次无条件写入的三条推荐种子。
const HEALTH_CHECK_SEEDS: [RecommendationTemplate; 3] = [
    RecommendationTemplate {
        title: "Optimize your content for AI search",
        rationale: "Assistants surface pages that answer buyer questions directly; your copy reads as feature lists",
        impact: Impact::High,
        effort: Effort::Medium,
        suggested_owner: Owner::Content,
        action_type: "content_optimization",
    },
    RecommendationTemplate {
        title: "Create an FAQ page answering buyer questions",
        rationale: "FAQ-style content maps one-to-one onto the prompts buyers ask assistants",
        impact: Impact::High,
        effort: Effort::Low,
        suggested_owner: Owner::Content,
        action_type: "faq_creation",
    },
    RecommendationTemplate {
        title: "Add structured data markup",
        rationale: "Schema.org annotations make your offering machine-readable for answer engines",
        impact: Impact::Medium,
        effort: Effort::Low,
        suggested_owner: Owner::Dev,
        action_type: "structured_data",
    },
];

pub fn default_catalog() -> &'static [RecommendationTemplate; 3] {
    &DEFAULT_CATALOG
}

pub fn health_check_seeds() -> &'static [RecommendationTemplate; 3] {
    &HEALTH_CHECK_SEEDS
}

/// 从候选集中选出恰好 N 条推荐。
///
/// 排序：impact 降序，其次 effort 升序（高影响低成本优先）；
/// (impact, effort) 相同的候选保持输入顺序（稳定排序，输入即插入顺序）。
/// 候选不足时按固定顺序取默认目录补齐，最终截断到恰好 N 条。
pub fn select_top_n<T>(
    candidates: Vec<T>,
    n: usize,
    key: impl Fn(&T) -> (Impact, Effort),
) -> Vec<TopPick<T>> {
    let mut ranked = candidates;
    // sort_by 是稳定排序：等键候选保持插入顺序，属性测试依赖这一点
    ranked.sort_by(|a, b| {
        let (impact_a, effort_a) = key(a);
        let (impact_b, effort_b) = key(b);
        impact_b.cmp(&impact_a).then(effort_a.cmp(&effort_b))
    });

    let mut picks: Vec<TopPick<T>> = ranked.into_iter().take(n).map(TopPick::Stored).collect();
    if picks.len() < n {
        let needed = n - picks.len();
        picks.extend(DEFAULT_CATALOG.iter().take(needed).map(TopPick::Default));
    }
    picks.truncate(n);
    picks
}
