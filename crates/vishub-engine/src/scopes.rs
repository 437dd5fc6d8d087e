use vishub_common::types::Scope;

/// 作用域校验失败：列出所有未知值，整个请求拒绝（不做部分接受）。
#[derive(Debug, thiserror::Error)]
#[error("unknown scopes: {}", values.join(", "))]
pub struct ScopeError {
    pub values: Vec<String>,
}

/// toggle 未显式传入 scopes 时的默认安全子集。
/// internalLinks / geoPages 风险较高，必须显式开启。
pub fn default_toggle_scopes() -> Vec<Scope> {
    vec![
        Scope::Meta,
        Scope::H1,
        Scope::AltText,
        Scope::Robots,
        Scope::Sitemap,
    ]
}

/// apply 在显式参数与项目配置都为空时的兜底作用域。
pub fn fallback_apply_scopes() -> Vec<Scope> {
    vec![Scope::Meta, Scope::H1, Scope::AltText]
}

/// 校验原始作用域字符串。任何未知值都使整个调用失败。
pub fn validate_scopes(raw: &[String]) -> Result<Vec<Scope>, ScopeError> {
    let mut scopes = Vec::with_capacity(raw.len());
    let mut unknown = Vec::new();
    for value in raw {
        match value.parse::<Scope>() {
            Ok(scope) => scopes.push(scope),
            Err(_) => unknown.push(value.clone()),
        }
    }
    if !unknown.is_empty() {
        return Err(ScopeError { values: unknown });
    }
    Ok(scopes)
}

/// apply 的作用域解析优先级：显式参数 > 项目配置 > 兜底集合。
pub fn resolve_apply_scopes(
    explicit: Option<Vec<Scope>>,
    project_scopes: &[Scope],
) -> Vec<Scope> {
    match explicit {
        Some(scopes) if !scopes.is_empty() => scopes,
        _ => {
            if project_scopes.is_empty() {
                fallback_apply_scopes()
            } else {
                project_scopes.to_vec()
            }
        }
    }
}
