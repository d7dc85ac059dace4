use std::fs;
use std::time::Duration;

use outreach_dashboard::models::config::DashboardConfig;

fn write(dir: &std::path::Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_profile_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "default.yaml",
        "api_base_url: \"http://localhost:8000/api\"\npage_size: 20\n",
    );
    write(
        dir.path(),
        "staging.yaml",
        "api_base_url: \"https://staging.example.com/api\"\npage_size: 50\ncache_ttl_secs: 60\n",
    );

    let config = DashboardConfig::load_from(dir.path(), "staging").unwrap();

    assert_eq!(config.api_base_url, "https://staging.example.com/api");
    assert_eq!(config.page_size, 50);
    assert_eq!(config.cache_ttl(), Some(Duration::from_secs(60)));
    assert_eq!(config.retry_max_attempts, 3);
    assert_eq!(config.search_debounce(), Duration::from_millis(300));
}

#[test]
fn test_missing_profile_is_optional() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "default.yaml",
        "api_base_url: \"http://localhost:8000/api\"\n",
    );

    let config = DashboardConfig::load_from(dir.path(), "local").unwrap();

    assert_eq!(config, DashboardConfig::new("http://localhost:8000/api"));
    assert_eq!(config.cache_ttl(), None);
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
}

#[test]
fn test_oversized_page_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "default.yaml",
        "api_base_url: \"http://localhost:8000/api\"\npage_size: 500\n",
    );

    assert!(DashboardConfig::load_from(dir.path(), "local").is_err());
}

#[test]
fn test_missing_defaults_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    assert!(DashboardConfig::load_from(dir.path(), "local").is_err());
}
