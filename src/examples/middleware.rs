//! Connector-style rotation through reqwest-middleware.

use proxy_rotator::{ProxyPoolConfig, ProxyRotationMiddleware, SelectionStrategy};
use reqwest_middleware::ClientBuilder;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let keys: Vec<String> = std::env::args().skip(1).collect();
    if keys.is_empty() {
        eprintln!("usage: middleware <provider-key>...");
        return Ok(());
    }

    let config = ProxyPoolConfig::builder()
        .api_keys(keys)
        .selection_strategy(SelectionStrategy::RoundRobin)
        .request_timeout(Duration::from_secs(10))
        .require_proxies(true)
        .build();

    let rotation = ProxyRotationMiddleware::new(config).await?;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(rotation)
        .build();

    for _ in 0..3 {
        let response = client.get("https://httpbin.org/ip").send().await?;
        println!("Status: {}", response.status());
        println!("Response: {}", response.text().await?);
    }

    Ok(())
}
