//! Pull-style rotation: fetch proxies once, then configure a client per request.

use proxy_rotator::{ProxyPool, ProxyPoolConfig, ProxyProtocol};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let keys: Vec<String> = std::env::args().skip(1).collect();
    if keys.is_empty() {
        eprintln!("usage: rotate <provider-key>...");
        return Ok(());
    }

    let config = ProxyPoolConfig::builder()
        .api_keys(keys)
        .protocol(ProxyProtocol::Socks5)
        .build();

    println!("Fetching proxies...");
    let pool = ProxyPool::init(config).await?;
    println!("{} proxies in pool", pool.len());

    for _ in 0..3 {
        let connector = pool.rotate_connector(ProxyProtocol::Socks5)?;
        let client = connector.build_client()?;
        let response = client.get("https://ipecho.net/plain").send().await?;
        println!(
            "{} -> {} {}",
            connector.descriptor(),
            response.status(),
            response.text().await?
        );
    }

    Ok(())
}
