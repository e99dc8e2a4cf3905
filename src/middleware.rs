//! Middleware implementation for reqwest.

use crate::config::ProxyPoolConfig;
use crate::error::RotatorError;
use crate::pool::ProxyPool;

use anyhow::anyhow;
use async_trait::async_trait;
use log::{info, warn};
use reqwest_middleware::{Error, Middleware, Next, Result};
use std::sync::Arc;

/// Middleware that sends every request through the next proxy of a pool.
#[derive(Clone)]
pub struct ProxyRotationMiddleware {
    /// The proxy pool.
    pool: Arc<ProxyPool>,
}

impl ProxyRotationMiddleware {
    /// Create the middleware, fetching the initial proxy list with `config`.
    pub async fn new(config: ProxyPoolConfig) -> std::result::Result<Self, RotatorError> {
        let pool = ProxyPool::init(config).await?;
        if pool.is_empty() {
            warn!("Proxy pool initialized without any proxies");
        }
        Ok(Self { pool })
    }

    /// Use an existing pool.
    pub fn from_pool(pool: Arc<ProxyPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<ProxyPool> {
        &self.pool
    }
}

#[async_trait]
impl Middleware for ProxyRotationMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        _extensions: &mut http::Extensions,
        _next: Next<'_>,
    ) -> Result<reqwest::Response> {
        let connector = self.pool.get_connector().map_err(|e| {
            warn!("No proxy available for {}: {}", req.url(), e);
            Error::Middleware(anyhow!(e))
        })?;

        info!("Using proxy: {}", connector.descriptor());

        let builder = connector.apply(reqwest::Client::builder()).map_err(|e| {
            warn!("Failed to configure proxy {}: {}", connector.descriptor(), e);
            Error::Middleware(anyhow!(e))
        })?;
        let client = builder
            .timeout(self.pool.config().request_timeout)
            .build()
            .map_err(|e| {
                warn!("Failed to build client with proxy {}: {}", connector.descriptor(), e);
                Error::Reqwest(e)
            })?;

        client.execute(req).await.map_err(|e| {
            warn!("Request failed with proxy {}: {}", connector.descriptor(), e);
            Error::Reqwest(e)
        })
    }
}
