//! Repository layer.
//!
//! Each repository is a zero-sized struct with async methods taking `&PgPool`.

pub mod product_repo;

pub use product_repo::ProductRepo;
