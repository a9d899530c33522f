//! # Scribe Core
//!
//! The domain layer of the Scribe blog.
//! Entities, pagination and the ports infrastructure implements; no I/O here.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
