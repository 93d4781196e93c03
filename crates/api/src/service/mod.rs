//! Operations behind the HTTP handlers.
//!
//! Services own the sequencing between the relational store and the image
//! store; handlers only extract input and hand back the envelope.

pub mod product;

pub use product::ProductService;
