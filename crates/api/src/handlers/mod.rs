//! Request handlers.
//!
//! Handlers extract path and form input, delegate to the matching service in
//! [`crate::service`] and return its envelope; errors are mapped by
//! [`AppError`](crate::error::AppError).

pub mod product;
