//! Core proxy pool implementation.
//!
//! The pool owns the registry of descriptors and the rotation cursor. The
//! registry is only ever replaced wholesale: a fetch cycle builds the new list
//! off to the side and swaps it in under the write lock, resetting the cursor
//! in the same critical section. Selection holds the read lock while it
//! advances the cursor, so it always sees a consistent registry and cursor.

use crate::config::{ProxyPoolConfig, SelectionStrategy};
use crate::connector::ProxyConnector;
use crate::error::{Result, RotatorError};
use crate::parser::{self, CredentialMode};
use crate::provider;
use crate::proxy::{ConnectionParameters, ProxyDescriptor, ProxyProtocol};

use log::{debug, info, warn};
use parking_lot::RwLock;
use rand::Rng;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Registry state. Construction of the pool does not fetch anything, so a
/// fresh pool starts out `Uninitialized`.
#[derive(Debug)]
enum PoolState {
    Uninitialized,
    Ready(Vec<ProxyDescriptor>),
}

/// A rotating pool of proxies fed from the provisioning API.
pub struct ProxyPool {
    /// Registry of proxies, in rotation order.
    state: RwLock<PoolState>,
    /// Index of the proxy `select_next` hands out next.
    cursor: AtomicUsize,
    /// Configuration for the pool.
    config: ProxyPoolConfig,
    /// Parsed provisioning endpoint.
    endpoint: Url,
    /// Client used for provider requests.
    client: Client,
}

impl ProxyPool {
    /// Create an empty, uninitialized pool with a default provider client.
    pub fn new(config: ProxyPoolConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Self::with_client(config, client)
    }

    /// Create an empty, uninitialized pool that talks to the provider through `client`.
    pub fn with_client(config: ProxyPoolConfig, client: Client) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        Ok(Self {
            state: RwLock::new(PoolState::Uninitialized),
            cursor: AtomicUsize::new(0),
            config,
            endpoint,
            client,
        })
    }

    /// Create a pool and run the first fetch cycle with the configured keys.
    pub async fn init(config: ProxyPoolConfig) -> Result<Arc<Self>> {
        let pool = Arc::new(Self::new(config)?);
        let count = pool.refresh().await?;
        info!("Proxy pool initialized with {} proxies", count);
        Ok(pool)
    }

    pub fn config(&self) -> &ProxyPoolConfig {
        &self.config
    }

    /// Fetch proxies for the configured keys and replace the registry.
    pub async fn refresh(&self) -> Result<usize> {
        self.fetch_and_populate(self.config.api_keys.as_slice(), self.config.include_credentials)
            .await
    }

    /// Fetch proxies for `keys`, in order, and replace the registry with their
    /// concatenation. Returns the new registry size.
    ///
    /// The cycle is all-or-nothing: a failed request or a malformed record for
    /// any key leaves the previous registry and cursor untouched.
    pub async fn fetch_and_populate<S: AsRef<str>>(
        &self,
        keys: &[S],
        include_credentials: bool,
    ) -> Result<usize> {
        check_keys(keys)?;
        let mode = CredentialMode::for_request(include_credentials);
        let mut proxies = Vec::new();

        for (index, key) in keys.iter().enumerate() {
            let url = provider::provider_url(
                &self.endpoint,
                key.as_ref(),
                self.config.output_format,
                include_credentials,
            )?;
            let records = provider::fetch_records(&self.client, url, self.config.output_format)
                .await
                .inspect_err(|e| warn!("Fetching proxies for key #{} failed: {}", index + 1, e))?;
            let parsed = parser::parse_records_with(&records, mode)?;
            info!("Fetched {} proxies for key #{}", parsed.len(), index + 1);
            proxies.extend(parsed);
        }

        self.install(proxies)
    }

    /// Blocking variant of [`ProxyPool::fetch_and_populate`] using `client`.
    #[cfg(feature = "blocking")]
    pub fn fetch_and_populate_blocking<S: AsRef<str>>(
        &self,
        client: &reqwest::blocking::Client,
        keys: &[S],
        include_credentials: bool,
    ) -> Result<usize> {
        check_keys(keys)?;
        let mode = CredentialMode::for_request(include_credentials);
        let mut proxies = Vec::new();

        for (index, key) in keys.iter().enumerate() {
            let url = provider::provider_url(
                &self.endpoint,
                key.as_ref(),
                self.config.output_format,
                include_credentials,
            )?;
            let records = provider::fetch_records_blocking(client, url, self.config.output_format)
                .inspect_err(|e| warn!("Fetching proxies for key #{} failed: {}", index + 1, e))?;
            let parsed = parser::parse_records_with(&records, mode)?;
            info!("Fetched {} proxies for key #{}", parsed.len(), index + 1);
            proxies.extend(parsed);
        }

        self.install(proxies)
    }

    /// Blocking variant of [`ProxyPool::refresh`]. Must not be called from
    /// inside an async runtime.
    #[cfg(feature = "blocking")]
    pub fn refresh_blocking(&self) -> Result<usize> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.request_timeout)
            .build()?;
        self.fetch_and_populate_blocking(
            &client,
            self.config.api_keys.as_slice(),
            self.config.include_credentials,
        )
    }

    /// Replace the registry with an externally obtained list.
    pub fn replace(&self, proxies: Vec<ProxyDescriptor>) -> Result<usize> {
        self.install(proxies)
    }

    fn install(&self, proxies: Vec<ProxyDescriptor>) -> Result<usize> {
        let count = proxies.len();
        if count == 0 {
            if self.config.require_proxies {
                warn!("No proxies to install, keeping previous registry");
                return Err(RotatorError::EmptyPool);
            }
            warn!("Installing an empty proxy registry");
        }

        let mut state = self.state.write();
        *state = PoolState::Ready(proxies);
        self.cursor.store(0, Ordering::Release);
        drop(state);

        info!("Proxy registry replaced with {} proxies", count);
        Ok(count)
    }

    /// Return the proxy at the cursor and advance the cursor by one, wrapping
    /// to the start after the last proxy.
    pub fn select_next(&self) -> Result<ProxyDescriptor> {
        let state = self.state.read();
        let proxies = ready(&state)?;
        let len = proxies.len();

        // Read-and-advance is a single atomic step; the read lock keeps
        // `install` from resetting the cursor underneath us.
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
            .unwrap_or_else(|i| i);
        debug!("Selected proxy #{} of {}", index, len);
        Ok(proxies[index].clone())
    }

    /// Return a uniformly random proxy. Does not move the cursor.
    pub fn select_random(&self) -> Result<ProxyDescriptor> {
        let state = self.state.read();
        let proxies = ready(&state)?;

        let index = rand::rng().random_range(0..proxies.len());
        debug!("Selected random proxy #{} of {}", index, proxies.len());
        Ok(proxies[index].clone())
    }

    /// Select a proxy according to the configured strategy.
    pub fn get_proxy(&self) -> Result<ProxyDescriptor> {
        match self.config.selection_strategy {
            SelectionStrategy::RoundRobin => self.select_next(),
            SelectionStrategy::Random => self.select_random(),
        }
    }

    /// Connection parameters for the next proxy in rotation.
    pub fn rotate(&self, protocol: ProxyProtocol) -> Result<ConnectionParameters> {
        Ok(self.select_next()?.connection_parameters(protocol))
    }

    /// Connection parameters for a random proxy.
    pub fn random_proxy(&self, protocol: ProxyProtocol) -> Result<ConnectionParameters> {
        Ok(self.select_random()?.connection_parameters(protocol))
    }

    /// Connector for the next proxy in rotation.
    pub fn rotate_connector(&self, protocol: ProxyProtocol) -> Result<ProxyConnector> {
        Ok(ProxyConnector::new(self.select_next()?, protocol))
    }

    /// Connector for a random proxy.
    pub fn random_connector(&self, protocol: ProxyProtocol) -> Result<ProxyConnector> {
        Ok(ProxyConnector::new(self.select_random()?, protocol))
    }

    /// Connector chosen by the configured strategy and protocol.
    pub fn get_connector(&self) -> Result<ProxyConnector> {
        Ok(ProxyConnector::new(self.get_proxy()?, self.config.protocol))
    }

    /// Snapshot of the registry in rotation order.
    pub fn proxies(&self) -> Vec<ProxyDescriptor> {
        match &*self.state.read() {
            PoolState::Uninitialized => Vec::new(),
            PoolState::Ready(proxies) => proxies.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match &*self.state.read() {
            PoolState::Uninitialized => 0,
            PoolState::Ready(proxies) => proxies.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether at least one fetch cycle has completed.
    pub fn is_initialized(&self) -> bool {
        matches!(*self.state.read(), PoolState::Ready(_))
    }
}

fn check_keys<S: AsRef<str>>(keys: &[S]) -> Result<()> {
    if keys.is_empty() {
        return Err(RotatorError::InvalidArgument(
            "at least one provider key is required".to_string(),
        ));
    }
    Ok(())
}

fn ready(state: &PoolState) -> Result<&[ProxyDescriptor]> {
    match state {
        PoolState::Uninitialized => Err(RotatorError::NotInitialized),
        PoolState::Ready(proxies) if proxies.is_empty() => Err(RotatorError::EmptyPool),
        PoolState::Ready(proxies) => Ok(proxies),
    }
}
