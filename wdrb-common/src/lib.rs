//! # Wardrobe Common Library
//!
//! Shared code for the wardrobe client crates:
//! - Wardrobe data model (categories, items, catalog views)
//! - Event types (WardrobeEvent enum) and the EventBus
//! - Configuration loading
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{Category, CategoryFilter, UserId, WardrobeItem};
