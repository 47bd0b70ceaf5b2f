//! # notesum-core
//!
//! Core types, traits, and abstractions for the notesum client.
//!
//! This crate provides the data model shared with the remote summarization
//! service, the error taxonomy, and the trait seams the stateful client
//! components are built against.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod timestamps;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result, ServiceError};
pub use models::*;
pub use traits::*;
