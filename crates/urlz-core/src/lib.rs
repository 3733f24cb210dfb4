//! Core types and traits for the urlz URL shortener.
//!
//! This crate provides the types shared by the generator, the storage
//! backends, the shortener service and the HTTP gateway.

pub mod error;
pub mod repository;
pub mod shortcode;

pub use error::{CoreError, StorageError};
pub use repository::{ReadRepository, Repository, UrlRecord};
pub use shortcode::ShortCode;
