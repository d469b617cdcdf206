use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "{context}: expected status {expected}, got {actual}"
    );
}

/// Items array of a pagination envelope.
pub fn page_items(page: &Value) -> anyhow::Result<&Vec<Value>> {
    page.get("items")
        .and_then(|v| v.as_array())
        .context("envelope.items is array")
}

/// Assert the envelope counters.
pub fn assert_page(page: &Value, items: usize, total: i64, page_no: u64, total_pages: i64) {
    let actual_items = page["items"].as_array().map(Vec::len).unwrap_or(usize::MAX);
    assert_eq!(actual_items, items, "items length in {page}");
    assert_eq!(page["total"].as_i64(), Some(total), "total in {page}");
    assert_eq!(page["page"].as_u64(), Some(page_no), "page in {page}");
    assert_eq!(
        page["total_pages"].as_i64(),
        Some(total_pages),
        "total_pages in {page}"
    );
}

/// Values of one string field across the envelope's items.
pub fn item_field(page: &Value, field: &str) -> anyhow::Result<Vec<String>> {
    page_items(page)?
        .iter()
        .map(|item| {
            item.get(field)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .with_context(|| format!("item.{field} is string"))
        })
        .collect()
}

/// Assert the standard error body and return its message.
pub fn assert_error_body(body: &Value, status: StatusCode, code: &str) -> String {
    let error = &body["error"];
    assert_eq!(error["status"].as_u64(), Some(u64::from(status.as_u16())), "{body}");
    assert_eq!(error["code"].as_str(), Some(code), "{body}");
    error["message"].as_str().unwrap_or_default().to_string()
}
