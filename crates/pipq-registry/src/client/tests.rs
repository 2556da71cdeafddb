use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{RegistryClient, RetryConfig};
use pipq_core::PipqError;

fn no_retries() -> RetryConfig {
    RetryConfig {
        max_retries: 0,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
        multiplier: 1.0,
    }
}

fn package_body(name: &str, version: &str) -> serde_json::Value {
    serde_json::json!({
        "info": { "name": name, "version": version, "summary": "test fixture" },
        "last_serial": 1,
        "releases": {
            version: [{
                "filename": format!("{}-{}.tar.gz", name, version),
                "packagetype": "sdist",
                "python_version": "source",
                "size": 512,
                "url": format!("https://files.example.org/{}-{}.tar.gz", name, version)
            }]
        },
        "urls": [],
        "vulnerabilities": []
    })
}

#[tokio::test]
async fn test_fetch_package_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package_body("widgets", "1.0.0")))
        .mount(&server)
        .await;

    let client = RegistryClient::with_base_url(&server.uri()).unwrap();
    let pkg = client.fetch_package("widgets").await.unwrap();
    assert_eq!(pkg.info.name, "widgets");
    assert_eq!(pkg.info.version, "1.0.0");
    assert_eq!(pkg.sorted_releases().len(), 1);
}

#[tokio::test]
async fn test_fetch_package_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = RegistryClient::with_base_url(&server.uri()).unwrap();
    let err = client.fetch_package("missing").await.unwrap_err();
    assert!(matches!(err, PipqError::PackageNotFound { .. }));
}

#[tokio::test]
async fn test_fetch_release_distinguishes_version_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/9.9.9/json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package_body("widgets", "1.0.0")))
        .mount(&server)
        .await;

    let client = RegistryClient::with_base_url(&server.uri()).unwrap();
    let err = client.fetch_release("widgets", "9.9.9").await.unwrap_err();
    match err {
        PipqError::VersionNotFound { name, release } => {
            assert_eq!(name, "widgets");
            assert_eq!(release, "9.9.9");
        },
        other => panic!("expected VersionNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_release_missing_package_stays_package_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = RegistryClient::with_base_url(&server.uri()).unwrap();
    let err = client.fetch_release("ghost", "1.0").await.unwrap_err();
    assert!(matches!(err, PipqError::PackageNotFound { .. }));
}

#[tokio::test]
async fn test_service_unavailable_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = RegistryClient::with_base_url(&server.uri())
        .unwrap()
        .retry_config(no_retries());
    let err = client.fetch_package("widgets").await.unwrap_err();
    assert!(matches!(err, PipqError::ServiceUnavailable));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_retry_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(package_body("widgets", "1.0.0")))
        .mount(&server)
        .await;

    let client = RegistryClient::with_base_url(&server.uri())
        .unwrap()
        .retry_config(RetryConfig {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        });
    let pkg = client.fetch_package("widgets").await.unwrap();
    assert_eq!(pkg.info.name, "widgets");
}

#[test]
fn test_invalid_base_url_rejected() {
    assert!(RegistryClient::with_base_url("not a url").is_err());
}
