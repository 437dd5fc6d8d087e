use serde::{Deserialize, Serialize};

/// Automatable site-fix category. Wire values are camelCase and must stay
/// stable — stored scope sets and changelog rows reference them verbatim.
///
/// # Examples
///
/// ```
/// use vishub_common::types::Scope;
///
/// let scope: Scope = "altText".parse().unwrap();
/// assert_eq!(scope, Scope::AltText);
/// assert_eq!(scope.to_string(), "altText");
/// assert!("bogus-scope".parse::<Scope>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    Meta,
    H1,
    Robots,
    Sitemap,
    AltText,
    InternalLinks,
    GeoPages,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Meta => "meta",
            Scope::H1 => "h1",
            Scope::Robots => "robots",
            Scope::Sitemap => "sitemap",
            Scope::AltText => "altText",
            Scope::InternalLinks => "internalLinks",
            Scope::GeoPages => "geoPages",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta" => Ok(Scope::Meta),
            "h1" => Ok(Scope::H1),
            "robots" => Ok(Scope::Robots),
            "sitemap" => Ok(Scope::Sitemap),
            "altText" => Ok(Scope::AltText),
            "internalLinks" => Ok(Scope::InternalLinks),
            "geoPages" => Ok(Scope::GeoPages),
            _ => Err(format!("unknown scope: {s}")),
        }
    }
}

/// 推荐项影响程度。声明顺序为升序，便于排序比较（High > Medium > Low）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "Low",
            Impact::Medium => "Medium",
            Impact::High => "High",
        }
    }
}

impl std::str::FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Impact::Low),
            "Medium" => Ok(Impact::Medium),
            "High" => Ok(Impact::High),
            _ => Err(format!("unknown impact: {s}")),
        }
    }
}

/// 推荐项实施成本。声明顺序为升序（Low < Medium < High）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effort::Low => "Low",
            Effort::Medium => "Medium",
            Effort::High => "High",
        }
    }
}

impl std::str::FromStr for Effort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Effort::Low),
            "Medium" => Ok(Effort::Medium),
            "High" => Ok(Effort::High),
            _ => Err(format!("unknown effort: {s}")),
        }
    }
}

/// 推荐项建议负责角色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Owner {
    Content,
    #[serde(rename = "PR")]
    #[allow(clippy::upper_case_acronyms)]
    PR,
    Dev,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::Content => "Content",
            Owner::PR => "PR",
            Owner::Dev => "Dev",
        }
    }
}

impl std::str::FromStr for Owner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Content" => Ok(Owner::Content),
            "PR" => Ok(Owner::PR),
            "Dev" => Ok(Owner::Dev),
            _ => Err(format!("unknown owner: {s}")),
        }
    }
}

/// 提及情感倾向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        })
    }
}

/// 站点脚本接入状态。autopilot 实际执行要求 connected。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SiteScriptStatus {
    Missing,
    Connected,
}

impl SiteScriptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteScriptStatus::Missing => "missing",
            SiteScriptStatus::Connected => "connected",
        }
    }
}

impl std::str::FromStr for SiteScriptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missing" => Ok(SiteScriptStatus::Missing),
            "connected" => Ok(SiteScriptStatus::Connected),
            _ => Err(format!("unknown site script status: {s}")),
        }
    }
}

/// 推荐项状态机：todo → in_progress → done。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Todo,
    InProgress,
    Done,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Todo => "todo",
            RecommendationStatus::InProgress => "in_progress",
            RecommendationStatus::Done => "done",
        }
    }
}

impl std::str::FromStr for RecommendationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(RecommendationStatus::Todo),
            "in_progress" => Ok(RecommendationStatus::InProgress),
            "done" => Ok(RecommendationStatus::Done),
            _ => Err(format!("unknown recommendation status: {s}")),
        }
    }
}

/// 变更任务状态，applied / failed 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeJobStatus {
    Queued,
    Applied,
    Failed,
}

impl ChangeJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeJobStatus::Queued => "queued",
            ChangeJobStatus::Applied => "applied",
            ChangeJobStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for ChangeJobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(ChangeJobStatus::Queued),
            "applied" => Ok(ChangeJobStatus::Applied),
            "failed" => Ok(ChangeJobStatus::Failed),
            _ => Err(format!("unknown change job status: {s}")),
        }
    }
}

/// 变更来源（autopilot 自动执行 / 人工操作）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    Autopilot,
    Manual,
}

impl ChangeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeSource::Autopilot => "autopilot",
            ChangeSource::Manual => "manual",
        }
    }
}

impl std::str::FromStr for ChangeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "autopilot" => Ok(ChangeSource::Autopilot),
            "manual" => Ok(ChangeSource::Manual),
            _ => Err(format!("unknown change source: {s}")),
        }
    }
}

// ---- Auth DTOs ----

/// 登录请求
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
}

/// 修改密码请求
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_wire_values_round_trip() {
        let all = [
            Scope::Meta,
            Scope::H1,
            Scope::Robots,
            Scope::Sitemap,
            Scope::AltText,
            Scope::InternalLinks,
            Scope::GeoPages,
        ];
        for scope in all {
            let wire = serde_json::to_string(&scope).unwrap();
            assert_eq!(wire, format!("\"{}\"", scope.as_str()));
            let parsed: Scope = scope.as_str().parse().unwrap();
            assert_eq!(parsed, scope);
        }
    }

    #[test]
    fn impact_orders_low_to_high() {
        assert!(Impact::High > Impact::Medium);
        assert!(Impact::Medium > Impact::Low);
        assert!(Effort::Low < Effort::High);
    }

    #[test]
    fn owner_pr_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Owner::PR).unwrap(), "\"PR\"");
        assert_eq!("PR".parse::<Owner>().unwrap(), Owner::PR);
    }
}
