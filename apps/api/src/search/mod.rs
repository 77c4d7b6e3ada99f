//! Multi-source job search with local relevance scoring, URL dedup and a
//! TTL cache.

pub mod cache;
pub mod dedup;
pub mod engine;
pub mod handlers;
pub mod matcher;
pub mod models;
pub mod sources;

pub use engine::SearchEngine;
