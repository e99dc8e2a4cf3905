use proxy_rotator::{
    ProxyDescriptor, ProxyPool, ProxyPoolConfig, ProxyProtocol, ProxyRotationMiddleware,
    RotatorError,
};
use reqwest_middleware::ClientBuilder;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_pool() -> Arc<ProxyPool> {
    let config = ProxyPoolConfig::builder()
        .protocol(ProxyProtocol::Http)
        .build();
    Arc::new(ProxyPool::new(config).unwrap())
}

#[tokio::test]
async fn test_request_is_routed_through_pool_proxy() {
    // The mock server plays the upstream HTTP proxy.
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .and(header("proxy-authorization", "Basic dTp3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
        .expect(1)
        .mount(&upstream)
        .await;

    let address = upstream.address();
    let pool = http_pool();
    pool.replace(vec![ProxyDescriptor::new(
        address.ip().to_string(),
        address.port(),
        "u",
        "w",
    )])
    .unwrap();

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(ProxyRotationMiddleware::from_pool(pool))
        .build();

    let response = client.get("http://target.invalid/ip").send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "via proxy");
}

#[tokio::test]
async fn test_uninitialized_pool_fails_request() {
    let client = ClientBuilder::new(reqwest::Client::new())
        .with(ProxyRotationMiddleware::from_pool(http_pool()))
        .build();

    let err = client.get("http://target.invalid/").send().await.unwrap_err();
    match err {
        reqwest_middleware::Error::Middleware(inner) => {
            assert!(matches!(
                inner.downcast_ref::<RotatorError>(),
                Some(RotatorError::NotInitialized)
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_empty_pool_fails_request() {
    let pool = http_pool();
    pool.replace(Vec::new()).unwrap();
    let middleware = ProxyRotationMiddleware::from_pool(pool);
    assert!(middleware.pool().is_initialized());

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(middleware)
        .build();

    let err = client.get("http://target.invalid/").send().await.unwrap_err();
    assert!(err.to_string().contains("no proxy available"));
}

#[tokio::test]
async fn test_credentials_with_url_delimiters_reach_proxy() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .and(header(
            "proxy-authorization",
            "Basic dXNlckBjb3JwOnBAc3MvdzpyZCMx",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&upstream)
        .await;

    let address = upstream.address();
    let pool = http_pool();
    pool.replace(vec![ProxyDescriptor::new(
        address.ip().to_string(),
        address.port(),
        "user@corp",
        "p@ss/w:rd#1",
    )])
    .unwrap();

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(ProxyRotationMiddleware::from_pool(pool))
        .build();

    let response = client.get("http://target.invalid/ip").send().await.unwrap();
    assert_eq!(response.status(), 200);
}
