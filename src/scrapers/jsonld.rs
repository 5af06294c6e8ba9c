use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

static LD_JSON: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector is valid")
});

/// Extracts `datePublished` from JSON-LD metadata in the HTML document.
/// Looks through top-level objects, arrays and `@graph` collections; the first
/// non-empty string wins.
pub fn extract_date_published(document: &Html) -> Option<String> {
    document.select(&LD_JSON).find_map(|script| {
        let raw = script.text().collect::<String>();
        let json = serde_json::from_str::<Value>(raw.trim()).ok()?;
        find_date(&json)
    })
}

fn find_date(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(find_date),
        Value::Object(obj) => {
            if let Some(date) = obj.get("datePublished").and_then(Value::as_str) {
                let date = date.trim();
                if !date.is_empty() {
                    return Some(date.to_string());
                }
            }
            obj.get("@graph").and_then(find_date)
        }
        _ => None,
    }
}
