//! # Quill Core
//!
//! The domain layer of the Quill posts service.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! post visibility, ownership checks and input validation.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod validation;

pub use error::DomainError;
pub use service::PostService;
