pub mod core;
pub mod extract;
pub mod mcp;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use self::core::types;
pub use self::core::types::*;
pub use self::core::AppState;

// --- Convenience module paths ---
pub use self::core::site;
pub use mcp::stdio as stdio_service;
pub use scraping::{browser_manager, gate, navigate};
pub use tools::{category, product, reviews, search, sellers};
