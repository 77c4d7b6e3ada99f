//! Suggestion review: path-addressed edits to the profile document.

pub mod apply;
pub mod error;
pub mod handlers;
pub mod models;
pub mod path;
pub mod session;
pub mod store;

pub use apply::ReviewEngine;
pub use error::ReviewError;
