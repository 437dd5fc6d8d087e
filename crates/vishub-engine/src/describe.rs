/// 审计记录的人类可读描述。作用域按写入时的原始字符串匹配，
/// 未知作用域回退到通用模板。
pub fn describe_change(scope: &str, count: u64) -> String {
    match scope {
        "meta" => format!("Optimized meta descriptions ({count} pages)"),
        "h1" => format!("Improved H1 headings ({count} pages)"),
        "altText" => format!("Added image alt text ({count} images)"),
        "robots" => "Updated robots.txt configuration".to_string(),
        "sitemap" => "Regenerated XML sitemap".to_string(),
        "internalLinks" => format!("Strengthened internal linking ({count} links)"),
        "geoPages" => format!("Published location landing pages ({count} pages)"),
        other => format!("Applied {other} fixes"),
    }
}
