// src/analytics.rs

use crate::api::ApiClient;
use crate::errors::RequestError;
use crate::models::{AnalyticsSummary, Product};
use std::collections::HashMap;

/// Everything the analytics view renders, loaded as one unit.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub summary: AnalyticsSummary,
    pub products: Vec<Product>,
}

impl Dashboard {
    /// The server's count when it sent one, otherwise the size of the listing.
    pub fn total_products(&self) -> u64 {
        self.summary
            .total_products
            .unwrap_or(self.products.len() as u64)
    }

    pub fn average_price(&self) -> Option<f64> {
        self.summary.price_statistics.as_ref().and_then(|s| s.mean)
    }

    pub fn top_brands(&self, limit: usize) -> Vec<(String, u64)> {
        brand_frequencies(&self.products, limit)
    }

    pub fn top_categories(&self, limit: usize) -> Vec<(String, u64)> {
        category_frequencies(&self.products, limit)
    }
}

/// Fetches the summary and the full listing concurrently.
///
/// Either failure fails the whole load; a half-loaded dashboard is never returned.
pub async fn load_dashboard(client: &ApiClient) -> Result<Dashboard, RequestError> {
    let (summary, listing) = tokio::try_join!(client.analytics(), client.all_products())?;
    log::debug!(
        "dashboard loaded: {} products listed, server total {:?}",
        listing.products.len(),
        summary.total_products
    );
    Ok(Dashboard {
        summary,
        products: listing.products,
    })
}

/// Counts labels, most frequent first; ties keep the order labels were first seen.
fn frequencies<'a, I>(labels: I, limit: usize) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for label in labels {
        match index.get(label) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(label, order.len());
                order.push((label.to_string(), 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(limit);
    order
}

pub fn brand_frequencies(products: &[Product], limit: usize) -> Vec<(String, u64)> {
    frequencies(
        products.iter().filter_map(|p| p.brand.as_deref()),
        limit,
    )
}

pub fn category_frequencies(products: &[Product], limit: usize) -> Vec<(String, u64)> {
    frequencies(
        products
            .iter()
            .flat_map(|p| p.categories.iter().map(String::as_str)),
        limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schema::product_from_value;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn product(id: &str, brand: Option<&str>, categories: &str) -> Product {
        product_from_value(&json!({
            "uniq_id": id,
            "brand": brand,
            "categories": categories,
        }))
        .unwrap()
    }

    fn catalogue() -> Vec<Product> {
        vec![
            product("1", Some("Subrtex"), "Furniture > Chairs"),
            product("2", Some("GOYMFK"), "Furniture > Storage, Racks"),
            product("3", Some("GOYMFK"), "Garden > Mats"),
            product("4", None, "Furniture > Racks"),
            product("5", Some("MUYETOL"), "Garden"),
        ]
    }

    #[test]
    fn test_brand_frequencies() {
        let brands = brand_frequencies(&catalogue(), 10);
        assert_eq!(
            brands,
            vec![
                ("GOYMFK".to_string(), 2),
                ("Subrtex".to_string(), 1),
                ("MUYETOL".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_category_frequencies_with_limit() {
        let categories = category_frequencies(&catalogue(), 3);
        assert_eq!(
            categories,
            vec![
                ("Furniture".to_string(), 3),
                ("Racks".to_string(), 2),
                ("Garden".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_frequencies_empty() {
        assert!(brand_frequencies(&[], 10).is_empty());
        assert!(category_frequencies(&catalogue(), 0).is_empty());
    }

    #[test]
    fn test_dashboard_total_falls_back_to_listing() {
        let dashboard = Dashboard {
            summary: AnalyticsSummary::default(),
            products: catalogue(),
        };
        assert_eq!(dashboard.total_products(), 5);
        assert_eq!(dashboard.average_price(), None);
    }

    async fn mount_summary(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/analytics/"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "total_products": 312,
                "price_statistics": {"min": 1.0, "max": 99.0, "mean": 30.25, "median": 25.0}
            })))
            .mount(server)
            .await;
    }

    async fn mount_products(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/analytics/products"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "products": [
                    {"uniq_id": "1", "brand": "GOYMFK", "categories": ["Garden", "Mats"]},
                    {"uniq_id": "2", "brand": "GOYMFK", "categories": "Garden"}
                ],
                "total": 2
            })))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_load_dashboard_joins_both_requests() {
        let server = MockServer::start().await;
        mount_summary(&server, 200).await;
        mount_products(&server, 200).await;

        let dashboard = load_dashboard(&client_for(&server)).await.unwrap();
        assert_eq!(dashboard.total_products(), 312);
        assert_eq!(dashboard.average_price(), Some(30.25));
        assert_eq!(dashboard.top_brands(10), vec![("GOYMFK".to_string(), 2)]);
        assert_eq!(dashboard.top_categories(1), vec![("Garden".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_load_dashboard_fails_if_either_fails() {
        let server = MockServer::start().await;
        mount_summary(&server, 200).await;
        mount_products(&server, 500).await;

        let err = load_dashboard(&client_for(&server)).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
