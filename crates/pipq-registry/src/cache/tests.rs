use std::time::Duration;

use super::MetadataCache;
use crate::api::PackageResponse;

fn sample_response(name: &str, version: &str) -> PackageResponse {
    serde_json::from_value(serde_json::json!({
        "info": { "name": name, "version": version },
        "last_serial": 1,
        "releases": {},
        "urls": [],
        "vulnerabilities": []
    }))
    .unwrap()
}

#[test]
fn test_key_shapes() {
    assert_eq!(MetadataCache::key("requests", None), "requests");
    assert_eq!(
        MetadataCache::key("requests", Some("2.28.0")),
        "requests@2.28.0"
    );
}

#[test]
fn test_insert_and_get() {
    let cache = MetadataCache::new();
    cache.insert("requests".to_string(), sample_response("requests", "2.28.0"));

    let hit = cache.get("requests").unwrap();
    assert_eq!(hit.info.name, "requests");
    assert!(cache.contains_fresh("requests"));
    assert!(cache.get("flask").is_none());
}

#[test]
fn test_expired_entry_is_removed_on_get() {
    let cache = MetadataCache::new();
    cache.insert_with_ttl(
        "requests".to_string(),
        sample_response("requests", "2.28.0"),
        Duration::from_secs(0),
    );

    assert!(cache.get("requests").is_none());
    assert_eq!(cache.stats().total_entries, 0);
}

#[test]
fn test_stats_and_cleanup() {
    let cache = MetadataCache::new();
    cache.insert("fresh".to_string(), sample_response("fresh", "1.0"));
    cache.insert_with_ttl(
        "stale".to_string(),
        sample_response("stale", "1.0"),
        Duration::from_secs(0),
    );

    let stats = cache.stats();
    assert_eq!(stats.total_entries, 2);
    assert_eq!(stats.fresh_entries, 1);
    assert_eq!(stats.stale_entries, 1);

    let removed = cache.cleanup();
    assert_eq!(removed, 1);
    assert_eq!(cache.stats().total_entries, 1);
}

#[test]
fn test_clear() {
    let cache = MetadataCache::new();
    cache.insert("requests".to_string(), sample_response("requests", "2.28.0"));
    cache.clear();
    assert_eq!(cache.stats().total_entries, 0);
}
