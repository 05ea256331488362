//! # rancher-metadata-core
//!
//! Core types and utilities for querying the Rancher metadata service.
//!
//! This crate holds everything that does not perform I/O: the error taxonomy,
//! client configuration, resource path resolution and the decoded response type
//! shared by the `rancher-metadata` client.
//!
//! ## Modules
//!
//! - [`error`] - Error types and stable error codes
//! - [`config`] - Configuration structures for metadata clients
//! - [`client`] - HTTP tuning defaults for the metadata transport
//! - [`path`] - Resource references and query path resolution
//! - [`types`] - Decoded metadata responses and integer coercion

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod path;
pub mod types;

// Re-export commonly used types
pub use config::MetadataClientConfig;
pub use error::{Error, Result};
pub use path::{Resource, ServiceRef};
pub use types::MetadataResponse;
