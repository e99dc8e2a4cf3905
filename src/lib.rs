//! # proxy-rotator
//!
//! A rotating proxy pool for reqwest.
//!
//! Proxies are fetched from a provisioning API, kept in an ordered registry
//! and handed out one at a time in round-robin order or at random, either as
//! proxy URLs to configure a client with, as ready-made connectors, or
//! transparently through a `reqwest-middleware` middleware.

pub mod config;
pub mod connector;
pub mod error;
pub mod middleware;
pub mod parser;
pub mod pool;
pub mod provider;
pub mod proxy;

pub use config::{OutputFormat, ProxyPoolConfig, ProxyPoolConfigBuilder, SelectionStrategy};
pub use connector::{build_connector, ProxyConnector};
pub use error::{Result, RotatorError};
pub use middleware::ProxyRotationMiddleware;
pub use parser::{parse_record, parse_records, CredentialMode};
pub use pool::ProxyPool;
pub use proxy::{format_for_protocol, ConnectionParameters, ProxyDescriptor, ProxyProtocol};
