use serde_json::{Map, Value};
use std::sync::Arc;

use crate::core::site::SORT_VALUES;
use crate::tools::{DEFAULT_LISTING_LIMIT, DEFAULT_REVIEWS_LIMIT, MAX_LISTING_LIMIT, MAX_REVIEWS_LIMIT};

#[derive(Clone, Debug)]
pub struct ToolCatalogEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn tool_catalog() -> Vec<ToolCatalogEntry> {
    vec![
        ToolCatalogEntry {
            name: "search_products",
            title: "Search Products",
            description: "Search marketplace products by free-text query. Returns id, name, brand, price, rating, and url per product. Waits out the site's anti-bot challenge; on an exhausted challenge returns {\"error\": \"antibot_blocked\"}.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query, e.g. 'iphone 15' or 'кроссовки nike'"},
                    "sort": {"type": "string", "enum": SORT_VALUES, "default": "popular",
                             "description": "Sort order; unknown values are passed to the site untouched"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": MAX_LISTING_LIMIT,
                              "default": DEFAULT_LISTING_LIMIT}
                },
                "required": ["query"]
            }),
        },
        ToolCatalogEntry {
            name: "get_product",
            title: "Product Details",
            description: "Fetch product details by numeric id or product URL: name, brand, price, old price, rating, reviews count, seller, and gallery images. Missing page elements degrade to absent fields, never to an error.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "product": {"type": "string",
                                "description": "Numeric product id (e.g. '482257013') or a product/catalog URL"}
                },
                "required": ["product"]
            }),
        },
        ToolCatalogEntry {
            name: "browse_category",
            title: "Browse Category",
            description: "List products from a category page given a full URL or a site-relative path such as '/catalog/elektronika/smartfony'.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "category": {"type": "string", "description": "Category URL or site-relative path"},
                    "sort": {"type": "string", "enum": SORT_VALUES, "default": "popular"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": MAX_LISTING_LIMIT,
                              "default": DEFAULT_LISTING_LIMIT}
                },
                "required": ["category"]
            }),
        },
        ToolCatalogEntry {
            name: "get_reviews",
            title: "Product Reviews",
            description: "Fetch customer reviews for a product: text, star rating, author, and date. Reviews without text are dropped.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "product_id": {"type": "string"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": MAX_REVIEWS_LIMIT,
                              "default": DEFAULT_REVIEWS_LIMIT}
                },
                "required": ["product_id"]
            }),
        },
        ToolCatalogEntry {
            name: "get_sellers",
            title: "Product Sellers",
            description: "List sellers offering a product with their prices, expanding the seller list on the product page when present.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "product_id": {"type": "string"}
                },
                "required": ["product_id"]
            }),
        },
    ]
}

pub fn schema_to_object_map(schema: &Value) -> Arc<Map<String, Value>> {
    match schema {
        Value::Object(map) => Arc::new(map.clone()),
        _ => Arc::new(Map::new()),
    }
}
