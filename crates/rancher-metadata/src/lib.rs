//! Client for the Rancher metadata service.
//!
//! This crate provides an asynchronous, read-only client that lets a process
//! running inside a Rancher-managed container discover facts about itself and
//! its peers: its own container and service, the containers of a service, the
//! host it runs on. Queries fail over across mirror endpoints and can wait for a
//! service to reach its declared scale.

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod resources;
pub mod transport;
pub mod watch;

pub use client::{MetadataClient, MetadataClientBuilder};
pub use models::{Container, Host, Service, ServiceContainers, Stack};
pub use rancher_metadata_core::{Error, MetadataClientConfig, MetadataResponse, ServiceRef};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use watch::{ConvergenceState, Sleeper, TokioSleeper, WatchOutcome, WatchState};

/// Convenient result alias that reuses the shared metadata error type.
pub type Result<T> = rancher_metadata_core::Result<T>;
