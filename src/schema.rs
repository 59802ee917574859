// src/schema.rs

//! The single adapter between the service's wire payloads and the canonical
//! in-memory model.
//!
//! The service has shipped two dialects that disagree on field names
//! (`similar_products` vs `items`, `reply` vs `message`,
//! `conversation_history` vs `messages`). Both are accepted here and nowhere
//! else. Payloads are validated on the way in: the expected containers must
//! have the right JSON type, and products without a usable id are dropped.

use crate::chat::{ChatMessage, Role};
use crate::config::ChatContract;
use crate::errors::RequestError;
use crate::models::{
    AnalyticsSummary, ChatReply, HealthStatus, PriceStatistics, Product, ProductListing,
    RecommendedProduct, SearchResults, SimilarProducts,
};
use crate::normalize::{extract_gen_text, normalize_categories, normalize_images, parse_price};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Version of the canonical model produced by this module.
pub const SCHEMA_VERSION: u32 = 1;

const SIMILAR_LIST_KEYS: [&str; 3] = ["similar_products", "items", "recommendations"];
const REPLY_KEYS: [&str; 2] = ["reply", "message"];

/// A conversation turn as the chat endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireChatMessage {
    pub role: &'static str,
    pub content: String,
    pub timestamp: String,
}

impl From<&ChatMessage> for WireChatMessage {
    fn from(message: &ChatMessage) -> Self {
        WireChatMessage {
            role: message.role.as_str(),
            content: message.content.clone(),
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}

/// Builds the chat request body from a conversation history.
///
/// The outgoing `message` is the last user turn. Under
/// [`ChatContract::ConversationHistory`] the earlier turns travel as
/// `conversation_history`; under [`ChatContract::Messages`] the full
/// history, including the last user turn, travels as `messages`.
/// System messages are never sent.
pub fn chat_request_body(
    history: &[ChatMessage],
    top_k: usize,
    contract: ChatContract,
) -> Result<Value, RequestError> {
    let turns: Vec<&ChatMessage> = history.iter().filter(|m| m.role != Role::System).collect();

    let last_user = turns
        .iter()
        .rposition(|m| m.role == Role::User)
        .ok_or(RequestError::NoUserMessage)?;
    let message = turns[last_user].content.clone();

    let body = match contract {
        ChatContract::ConversationHistory => {
            let earlier: Vec<WireChatMessage> =
                turns[..last_user].iter().map(|m| WireChatMessage::from(*m)).collect();
            json!({
                "message": message,
                "conversation_history": earlier,
                "top_k": top_k,
            })
        }
        ChatContract::Messages => {
            let all: Vec<WireChatMessage> = turns.iter().map(|m| WireChatMessage::from(*m)).collect();
            json!({
                "message": message,
                "messages": all,
                "top_k": top_k,
            })
        }
    };
    Ok(body)
}

pub fn search_request_body(query: &str, top_k: usize, include_description: bool) -> Value {
    json!({
        "query": query,
        "top_k": top_k,
        "include_description": include_description,
    })
}

fn expect_object<'a>(url: &str, body: &'a Value) -> Result<&'a Map<String, Value>, RequestError> {
    body.as_object()
        .ok_or_else(|| RequestError::schema(url, format!("expected a JSON object, got {}", kind(body))))
}

/// Looks up an optional list field; present-but-not-an-array is a schema error.
fn optional_array<'a>(
    url: &str,
    obj: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Vec<Value>>, RequestError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(RequestError::schema(
            url,
            format!("field `{}` should be an array, got {}", key, kind(other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count_field(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64))
}

fn number_field(value: Option<&Value>) -> Option<f64> {
    value?.as_f64().filter(|f| f.is_finite())
}

/// Coerces one wire product. Returns `None` when it has no usable id.
pub fn product_from_value(value: &Value) -> Option<Product> {
    let obj = value.as_object()?;
    let uniq_id = text_field(obj.get("uniq_id"))?.trim().to_string();

    let price_label = match obj.get("price") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Some(Product {
        uniq_id,
        title: text_field(obj.get("title")).unwrap_or_default(),
        brand: text_field(obj.get("brand")),
        description: text_field(obj.get("description")),
        price: parse_price(obj.get("price")),
        price_label,
        categories: normalize_categories(obj.get("categories")),
        images: normalize_images(obj.get("images")),
        manufacturer: text_field(obj.get("manufacturer")),
        package_dimensions: text_field(obj.get("package_dimensions")),
        country_of_origin: text_field(obj.get("country_of_origin")),
        material: text_field(obj.get("material")),
        color: text_field(obj.get("color")),
    })
}

/// Coerces one ranked item. Accepts both `{product, score, generated_description}`
/// and a flat product carrying `score` next to its own fields.
pub fn recommendation_from_value(value: &Value) -> Option<RecommendedProduct> {
    let obj = value.as_object()?;
    let product = match obj.get("product") {
        Some(nested @ Value::Object(_)) => product_from_value(nested),
        _ => product_from_value(value),
    }?;

    Some(RecommendedProduct {
        product,
        score: number_field(obj.get("score")),
        generated_text: extract_gen_text(obj.get("generated_description")),
    })
}

fn recommendations_from(url: &str, items: Option<&Vec<Value>>) -> Vec<RecommendedProduct> {
    let Some(items) = items else {
        return Vec::new();
    };
    let recs: Vec<RecommendedProduct> = items.iter().filter_map(recommendation_from_value).collect();
    if recs.len() < items.len() {
        log::warn!(
            "dropped {} item(s) without a product id from {}",
            items.len() - recs.len(),
            url
        );
    }
    recs
}

pub fn parse_health(url: &str, body: &Value) -> Result<HealthStatus, RequestError> {
    let obj = expect_object(url, body)?;
    let status = text_field(obj.get("status"))
        .ok_or_else(|| RequestError::schema(url, "missing `status`"))?;
    Ok(HealthStatus { status })
}

pub fn parse_search(url: &str, query: &str, body: &Value) -> Result<SearchResults, RequestError> {
    let obj = expect_object(url, body)?;
    let recommendations = recommendations_from(url, optional_array(url, obj, "recommendations")?);
    let total_results = count_field(obj.get("total_results"))
        .map(|t| t as usize)
        .unwrap_or(recommendations.len());

    Ok(SearchResults {
        query: text_field(obj.get("query")).unwrap_or_else(|| query.to_string()),
        recommendations,
        total_results,
        processing_time: number_field(obj.get("processing_time")),
    })
}

pub fn parse_chat_reply(url: &str, body: &Value) -> Result<ChatReply, RequestError> {
    let obj = expect_object(url, body)?;
    let reply = REPLY_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::to_string);
    let recommendations = recommendations_from(url, optional_array(url, obj, "recommendations")?);

    Ok(ChatReply {
        reply,
        recommendations,
    })
}

pub fn parse_similar(
    url: &str,
    product_id: &str,
    top_k: usize,
    body: &Value,
) -> Result<SimilarProducts, RequestError> {
    let items = match body {
        Value::Array(items) => Some(items),
        _ => {
            let obj = expect_object(url, body)?;
            let mut found = None;
            for key in SIMILAR_LIST_KEYS {
                if let Some(items) = optional_array(url, obj, key)? {
                    found = Some(items);
                    break;
                }
            }
            found
        }
    };

    let mut items = recommendations_from(url, items);
    items.truncate(top_k);

    Ok(SimilarProducts {
        product_id: product_id.to_string(),
        items,
    })
}

pub fn parse_product_listing(url: &str, body: &Value) -> Result<ProductListing, RequestError> {
    let (raw, total) = match body {
        Value::Array(items) => (items, None),
        _ => {
            let obj = expect_object(url, body)?;
            let items = optional_array(url, obj, "products")?
                .ok_or_else(|| RequestError::schema(url, "missing `products`"))?;
            (items, count_field(obj.get("total")))
        }
    };

    let products: Vec<Product> = raw.iter().filter_map(product_from_value).collect();
    if products.len() < raw.len() {
        log::warn!(
            "dropped {} product(s) without an id from {}",
            raw.len() - products.len(),
            url
        );
    }
    let total = total.map(|t| t as usize).unwrap_or(products.len());
    Ok(ProductListing { products, total })
}

fn distribution(value: Option<&Value>) -> BTreeMap<String, u64> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| count_field(Some(v)).map(|c| (k.clone(), c)))
                .collect()
        })
        .unwrap_or_default()
}

fn top_brands(value: Option<&Value>) -> Vec<(String, u64)> {
    let mut brands: Vec<(String, u64)> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let brand = text_field(item.get("brand"))?;
                let count = count_field(item.get("count")).unwrap_or(0);
                Some((brand, count))
            })
            .collect(),
        Some(Value::Object(_)) => distribution(value).into_iter().collect(),
        _ => Vec::new(),
    };
    brands.sort_by(|a, b| b.1.cmp(&a.1));
    brands
}

pub fn parse_analytics(url: &str, body: &Value) -> Result<AnalyticsSummary, RequestError> {
    let obj = expect_object(url, body)?;

    let price_statistics = obj
        .get("price_statistics")
        .and_then(Value::as_object)
        .map(|stats| PriceStatistics {
            min: number_field(stats.get("min")),
            max: number_field(stats.get("max")),
            mean: number_field(stats.get("mean")),
            median: number_field(stats.get("median")),
        });

    Ok(AnalyticsSummary {
        total_products: count_field(obj.get("total_products")),
        price_statistics,
        categories_distribution: distribution(obj.get("categories_distribution")),
        brand_distribution: distribution(obj.get("brand_distribution")),
        material_distribution: distribution(obj.get("material_distribution")),
        color_distribution: distribution(obj.get("color_distribution")),
        country_distribution: distribution(obj.get("country_distribution")),
        price_ranges: distribution(obj.get("price_ranges")),
        top_brands: top_brands(obj.get("top_brands")),
    })
}
