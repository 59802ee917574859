// src/normalize.rs

//! Coercion of loosely-typed product fields into their canonical shapes.
//!
//! The recommendation service is inconsistent about how it encodes list
//! fields and prices: the same field may arrive as a JSON array, a
//! JSON-encoded array inside a string, a delimited string, or a number.
//! Every function here accepts whatever was on the wire and never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static NON_PRICE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").unwrap());
static LEADING_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]*(\.[0-9]*)?").unwrap());

/// Canonical image list: ordered, no blank entries.
///
/// Plain strings are split on `,` after a strict JSON-array parse fails.
pub fn normalize_images(value: Option<&Value>) -> Vec<String> {
    normalize_list(value, &[','])
}

/// Canonical category list.
///
/// Plain strings are split on the `>` hierarchy separator first and then each
/// segment on `,`, so `"Furniture > Storage, Racks"` flattens to
/// `["Furniture", "Storage", "Racks"]`.
pub fn normalize_categories(value: Option<&Value>) -> Vec<String> {
    normalize_list(value, &['>', ','])
}

fn normalize_list(value: Option<&Value>, separators: &[char]) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => from_array(items),
        Some(Value::String(raw)) => from_string(raw, separators),
        Some(other) => {
            log::debug!("ignoring {} where a list was expected", other);
            Vec::new()
        }
    }
}

fn from_string(raw: &str, separators: &[char]) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
        return from_array(&items);
    }
    split_plain(raw, separators)
}

fn from_array(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn split_plain(raw: &str, separators: &[char]) -> Vec<String> {
    let mut parts = vec![raw.to_string()];
    for sep in separators {
        parts = parts
            .iter()
            .flat_map(|p| p.split(*sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    parts
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Generated marketing text of a recommendation.
///
/// Returns `None` only when nothing was generated; an empty `text` field is
/// passed through as `Some("")`.
pub fn extract_gen_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Numeric price from a currency-decorated string such as `"₹1,299.50"`.
///
/// Everything but ASCII digits and `.` is stripped; the longest leading
/// decimal literal is parsed. Numbers pass through when finite.
pub fn parse_price(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|p| p.is_finite()),
        Value::String(raw) => parse_price_str(raw),
        _ => None,
    }
}

pub fn parse_price_str(raw: &str) -> Option<f64> {
    let cleaned = NON_PRICE_CHARS.replace_all(raw, "");
    let literal = LEADING_DECIMAL.find(&cleaned)?.as_str();
    if !literal.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    literal.parse::<f64>().ok().filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_absent_lists_are_empty() {
        assert!(normalize_images(None).is_empty());
        assert!(normalize_images(Some(&Value::Null)).is_empty());
        assert!(normalize_categories(None).is_empty());
        assert!(normalize_categories(Some(&json!(""))).is_empty());
    }

    #[test]
    fn test_scalar_lists_are_empty() {
        assert!(normalize_images(Some(&json!(false))).is_empty());
        assert!(normalize_images(Some(&json!(true))).is_empty());
        assert!(normalize_categories(Some(&json!(0))).is_empty());
        assert!(normalize_categories(Some(&json!(12.5))).is_empty());
        assert!(normalize_images(Some(&json!({"url": "a.jpg"}))).is_empty());
    }

    #[test]
    fn test_images_from_json_encoded_string() {
        let value = json!("[\"a.jpg\",\"b.jpg\"]");
        assert_eq!(normalize_images(Some(&value)), strings(&["a.jpg", "b.jpg"]));
    }

    #[test]
    fn test_images_from_comma_separated_string() {
        let value = json!("a.jpg, b.jpg");
        assert_eq!(normalize_images(Some(&value)), strings(&["a.jpg", "b.jpg"]));
    }

    #[test]
    fn test_images_malformed_json_falls_back_to_split() {
        let value = json!("[\"a.jpg\", b.jpg");
        assert_eq!(
            normalize_images(Some(&value)),
            strings(&["[\"a.jpg\"", "b.jpg"])
        );
    }

    #[test]
    fn test_images_array_keeps_order_and_drops_blanks() {
        let value = json!(["https://x/2.jpg", "  ", "https://x/1.jpg", null]);
        assert_eq!(
            normalize_images(Some(&value)),
            strings(&["https://x/2.jpg", "https://x/1.jpg"])
        );
    }

    #[test]
    fn test_categories_hierarchy_and_siblings() {
        let value = json!("Furniture > Storage, Racks");
        assert_eq!(
            normalize_categories(Some(&value)),
            strings(&["Furniture", "Storage", "Racks"])
        );
    }

    #[test]
    fn test_categories_flatten_left_to_right() {
        let value = json!("Home & Kitchen > Furniture, Decor > Mats ,, > Doormats");
        assert_eq!(
            normalize_categories(Some(&value)),
            strings(&["Home & Kitchen", "Furniture", "Decor", "Mats", "Doormats"])
        );
    }

    #[test]
    fn test_categories_json_string_is_not_split_on_separators() {
        let value = json!("[\"Patio, Lawn & Garden\", \"Doormats\"]");
        assert_eq!(
            normalize_categories(Some(&value)),
            strings(&["Patio, Lawn & Garden", "Doormats"])
        );
    }

    #[test]
    fn test_list_normalizers_are_idempotent() {
        let inputs = [
            json!("Furniture > Storage, Racks"),
            json!("[\"a.jpg\",\"b.jpg\"]"),
            json!(["x", " ", "y"]),
            json!(null),
        ];
        for input in inputs {
            let once = normalize_categories(Some(&input));
            let twice = normalize_categories(Some(&json!(once)));
            assert_eq!(once, twice);

            let once = normalize_images(Some(&input));
            let twice = normalize_images(Some(&json!(once)));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_no_blank_entries_survive() {
        let value = json!(" , ,a,  ,b , ");
        let out = normalize_images(Some(&value));
        assert_eq!(out, strings(&["a", "b"]));
        assert!(out.iter().all(|s| !s.trim().is_empty()));
    }

    #[test]
    fn test_extract_gen_text_shapes() {
        assert_eq!(extract_gen_text(None), None);
        assert_eq!(extract_gen_text(Some(&Value::Null)), None);
        assert_eq!(extract_gen_text(Some(&json!("hello"))), Some("hello".to_string()));
        assert_eq!(
            extract_gen_text(Some(&json!({"text": "hi", "original": null, "timestamp": "2024-01-01"}))),
            Some("hi".to_string())
        );
        assert_eq!(extract_gen_text(Some(&json!({"text": ""}))), Some(String::new()));
        assert_eq!(extract_gen_text(Some(&json!({"original": "x"}))), None);
    }

    #[test]
    fn test_extract_gen_text_is_idempotent() {
        let first = extract_gen_text(Some(&json!({"text": "Sturdy rack"})));
        let second = extract_gen_text(first.as_ref().map(|t| json!(t)).as_ref());
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some(&json!("₹1,299.50"))), Some(1299.5));
        assert_eq!(parse_price(Some(&json!("$24.99"))), Some(24.99));
        assert_eq!(parse_price(None), None);
        assert_eq!(parse_price(Some(&Value::Null)), None);
        assert_eq!(parse_price(Some(&json!("free"))), None);
        assert_eq!(parse_price(Some(&json!("."))), None);
        assert_eq!(parse_price(Some(&json!(""))), None);
    }

    #[test]
    fn test_parse_price_overflow_is_none() {
        assert_eq!(parse_price_str(&"9".repeat(400)), None);
        assert_eq!(parse_price(Some(&json!(format!("₹{}", "9".repeat(400))))), None);
    }

    #[test]
    fn test_parse_price_numeric_and_prefix() {
        assert_eq!(parse_price(Some(&json!(18.5))), Some(18.5));
        assert_eq!(parse_price(Some(&json!(1299.5))), Some(1299.5));
        assert_eq!(parse_price_str("1.2.3"), Some(1.2));
        assert_eq!(parse_price_str("12."), Some(12.0));
    }
}
