// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A furniture item in its canonical, already-normalized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub uniq_id: String,
    pub title: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// Parsed price, `None` when the wire value carried no usable number.
    pub price: Option<f64>,
    /// The price exactly as the service sent it, for display fallbacks.
    pub price_label: Option<String>,
    pub categories: Vec<String>,
    pub images: Vec<String>,
    pub manufacturer: Option<String>,
    pub package_dimensions: Option<String>,
    pub country_of_origin: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A product returned by one of the ranking endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub product: Product,
    /// Relevance score; `None` means the item was not ranked.
    pub score: Option<f64>,
    pub generated_text: Option<String>,
}

impl RecommendedProduct {
    /// Text to show under the card: generated copy wins over the catalogue description.
    pub fn display_text(&self) -> Option<&str> {
        self.generated_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.product.description.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up"
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub recommendations: Vec<RecommendedProduct>,
    pub total_results: usize,
    /// Server-side processing time in seconds, when reported.
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub reply: Option<String>,
    pub recommendations: Vec<RecommendedProduct>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarProducts {
    pub product_id: String,
    pub items: Vec<RecommendedProduct>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Aggregate catalogue figures computed by the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSummary {
    pub total_products: Option<u64>,
    pub price_statistics: Option<PriceStatistics>,
    pub categories_distribution: BTreeMap<String, u64>,
    pub brand_distribution: BTreeMap<String, u64>,
    pub material_distribution: BTreeMap<String, u64>,
    pub color_distribution: BTreeMap<String, u64>,
    pub country_distribution: BTreeMap<String, u64>,
    pub price_ranges: BTreeMap<String, u64>,
    pub top_brands: Vec<(String, u64)>,
}

/// One line of the API call log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    /// HTTP status, `None` when no response was received.
    pub response_status: Option<u16>,
    pub response_time_ms: u128,
}
