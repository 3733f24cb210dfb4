//! URL shortener service implementation.
//!
//! Ties the short ID generator to a [`Repository`](urlz_core::Repository)
//! and enforces the rules for creating, updating and deleting links.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::ShortenerError;
pub use service::ShortenerService;
pub use shortener::Shortener;
