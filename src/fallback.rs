//! Synthesized offline content
//!
//! Used when neither the network nor a cache partition can answer. Every
//! function here is infallible and does no I/O.

use crate::request::{Category, Response, FROM_CACHE_HEADER};
use chrono::Utc;
use serde::Serialize;

const OFFLINE_MESSAGE: &str = "You are offline. Please try again once the connection is restored.";

const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Offline</title>
  <style>
    body { font-family: system-ui, sans-serif; text-align: center; padding: 2rem;
           min-height: 100vh; margin: 0; display: flex; flex-direction: column;
           justify-content: center; align-items: center; background: #f5f4e8; color: #2c2c2c; }
    h1 { font-size: 1.5rem; color: #b8962e; }
    p { line-height: 1.6; opacity: 0.8; }
  </style>
</head>
<body>
  <h1>You are offline</h1>
  <p>The network connection was lost.<br>Check your connection and try again.</p>
  <button onclick="window.location.reload()">Retry</button>
</body>
</html>
"#;

const PLACEHOLDER_SVG: &str = r##"<svg width="200" height="200" xmlns="http://www.w3.org/2000/svg">
  <rect width="200" height="200" fill="#f5f4e8"/>
  <text x="100" y="100" font-family="sans-serif" font-size="14" text-anchor="middle" dominant-baseline="middle" fill="#999">offline</text>
</svg>
"##;

/// Body of the structured offline API response
#[derive(Debug, Serialize)]
pub struct OfflineBody {
    pub error: &'static str,
    pub message: &'static str,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Offline HTML page
pub fn offline_page() -> Response {
    Response::new(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_header(FROM_CACHE_HEADER, "offline-page")
        .with_body(OFFLINE_PAGE)
}

/// Placeholder image
pub fn placeholder_image() -> Response {
    Response::new(200)
        .with_header("content-type", "image/svg+xml")
        .with_header(FROM_CACHE_HEADER, "placeholder")
        .with_body(PLACEHOLDER_SVG)
}

/// Structured 503 for API callers
pub fn offline_api() -> Response {
    let body = OfflineBody {
        error: "offline",
        message: OFFLINE_MESSAGE,
        timestamp: Utc::now().timestamp_millis(),
    };
    // serializing a struct of plain strings and an integer cannot fail
    let json = serde_json::to_vec(&body).unwrap_or_else(|_| br#"{"error":"offline"}"#.to_vec());

    Response::new(503)
        .with_header("content-type", "application/json")
        .with_header(FROM_CACHE_HEADER, "offline-fallback")
        .with_body(json)
}

/// Fallback content for a category, if one is defined
pub fn for_category(category: Category) -> Option<Response> {
    match category {
        Category::Document => Some(offline_page()),
        Category::Image => Some(placeholder_image()),
        Category::Api => Some(offline_api()),
        Category::StyleScript | Category::Other => None,
    }
}
