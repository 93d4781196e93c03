//! Domain layer for the storefront service.
//!
//! Holds the shared id/timestamp aliases, the domain error type, product input
//! validation and the image storage abstraction. Nothing in here knows about
//! HTTP or SQL.

pub mod error;
pub mod image_store;
pub mod product;
pub mod types;
