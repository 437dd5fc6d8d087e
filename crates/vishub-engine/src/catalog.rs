use vishub_common::types::Scope;

/// 固定修复模板：一个作用域对应一批静态页面修复。
/// 占位执行层 — 页面清单与数量不来自真实站点扫描，
/// 但 job / log / 回滚令牌的契约以此为准。
#[derive(Debug, Clone, Copy)]
pub struct FixTemplate {
    pub scope: Scope,
    pub description: &'static str,
    pub pages: &'static [&'static str],
    pub count: u32,
}

const FIX_CATALOG: [FixTemplate; 3] = [
    FixTemplate {
        scope: Scope::Meta,
        description: "Rewrote meta descriptions to answer buyer-intent queries",
        pages: &["/", "/pricing", "/features"],
        count: 3,
    },
    FixTemplate {
        scope: Scope::AltText,
        description: "Added descriptive alt text to product imagery",
        pages: &["/features", "/gallery"],
        count: 12,
    },
    FixTemplate {
        scope: Scope::H1,
        description: "Aligned H1 headings with primary buyer questions",
        pages: &["/", "/features"],
        count: 2,
    },
];

/// 完整修复目录（固定顺序，apply 按此顺序执行）。
pub fn fix_catalog() -> &'static [FixTemplate] {
    &FIX_CATALOG
}

/// 目录中作用域与解析结果相交的条目，保持目录顺序。
pub fn matching_fixes(resolved: &[Scope]) -> Vec<&'static FixTemplate> {
    FIX_CATALOG
        .iter()
        .filter(|fix| resolved.contains(&fix.scope))
        .collect()
}
