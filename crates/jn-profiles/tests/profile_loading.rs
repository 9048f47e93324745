use jn_profiles::{Error, ProfileRoot, ProfileService, ProfileType};
use jn_types::Tier;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_profile(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn service(roots: Vec<(&TempDir, Tier)>) -> ProfileService {
    ProfileService::new(
        roots
            .into_iter()
            .map(|(dir, tier)| ProfileRoot {
                root: dir.path().to_path_buf(),
                tier,
            })
            .collect(),
    )
}

#[test]
fn load_http_profile_with_meta_defaults() {
    let tier = TempDir::new().unwrap();
    write_profile(
        tier.path(),
        "http/api/_meta.json",
        r#"{"base_url": "https://api.example.com", "headers": {"Accept": "application/json"}}"#,
    );
    write_profile(
        tier.path(),
        "http/api/users.json",
        r#"{"path": "/v1/users", "headers": {"X-Trace": "on"}}"#,
    );

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let profile = svc.load(ProfileType::Http, "api", "users", false).unwrap();

    assert_eq!(profile.doc["base_url"], "https://api.example.com");
    assert_eq!(profile.doc["path"], "/v1/users");
    // ancestor headers merge with the profile's own
    assert_eq!(profile.doc["headers"]["Accept"], "application/json");
    assert_eq!(profile.doc["headers"]["X-Trace"], "on");
    assert!(profile.sql.is_none());
}

#[test]
fn profile_overrides_ancestor_defaults() {
    let tier = TempDir::new().unwrap();
    write_profile(
        tier.path(),
        "http/api/_meta.json",
        r#"{"base_url": "https://old.example.com", "timeout": 10}"#,
    );
    write_profile(
        tier.path(),
        "http/api/users.json",
        r#"{"base_url": "https://new.example.com"}"#,
    );

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let profile = svc.load(ProfileType::Http, "api", "users", false).unwrap();

    assert_eq!(profile.doc["base_url"], "https://new.example.com");
    assert_eq!(profile.doc["timeout"], 10);
}

#[test]
fn nested_name_collects_intermediate_meta() {
    let tier = TempDir::new().unwrap();
    write_profile(tier.path(), "http/api/_meta.json", r#"{"base_url": "https://h", "a": 1}"#);
    write_profile(tier.path(), "http/api/v2/_meta.json", r#"{"a": 2, "b": 2}"#);
    write_profile(tier.path(), "http/api/v2/users.json", r#"{"b": 3}"#);

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let profile = svc
        .load(ProfileType::Http, "api", "v2/users", false)
        .unwrap();

    // deeper levels override shallower, profile overrides all
    assert_eq!(profile.doc["a"], 2);
    assert_eq!(profile.doc["b"], 3);
}

#[test]
fn environment_substitution_in_loaded_document() {
    let tier = TempDir::new().unwrap();
    write_profile(
        tier.path(),
        "http/api/users.json",
        r#"{"base_url": "https://api.example.com", "headers": {"Auth": "${JN_TEST_TOKEN_A}"}}"#,
    );

    unsafe { std::env::set_var("JN_TEST_TOKEN_A", "abc") };
    let svc = service(vec![(&tier, Tier::Bundled)]);
    let profile = svc.load(ProfileType::Http, "api", "users", true).unwrap();

    assert_eq!(profile.doc["headers"]["Auth"], "abc");
}

#[test]
fn substitution_can_be_disabled() {
    let tier = TempDir::new().unwrap();
    write_profile(
        tier.path(),
        "http/api/users.json",
        r#"{"base_url": "https://h", "headers": {"Auth": "${JN_TEST_TOKEN_B}"}}"#,
    );

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let profile = svc.load(ProfileType::Http, "api", "users", false).unwrap();

    assert_eq!(profile.doc["headers"]["Auth"], "${JN_TEST_TOKEN_B}");
}

#[test]
fn duckdb_profile_carries_sql_and_meta() {
    let tier = TempDir::new().unwrap();
    write_profile(
        tier.path(),
        "duckdb/warehouse/_meta.json",
        r#"{"database": "analytics.db", "params": {"limit": 100}}"#,
    );
    write_profile(
        tier.path(),
        "duckdb/warehouse/daily.sql",
        "SELECT * FROM events WHERE day = current_date;\n",
    );

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let profile = svc
        .load(ProfileType::Duckdb, "warehouse", "daily", false)
        .unwrap();

    assert_eq!(profile.doc["database"], "analytics.db");
    assert_eq!(profile.doc["params"]["limit"], 100);
    assert!(profile.sql.unwrap().starts_with("SELECT * FROM events"));
}

#[test]
fn http_profile_without_base_url_is_rejected() {
    let tier = TempDir::new().unwrap();
    write_profile(tier.path(), "http/api/users.json", r#"{"path": "/v1/users"}"#);

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let err = svc
        .load(ProfileType::Http, "api", "users", false)
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "base_url", .. }));
}

#[test]
fn file_profile_without_pattern_is_rejected() {
    let tier = TempDir::new().unwrap();
    write_profile(tier.path(), "file/logs/recent.json", r#"{"filter": ["sort"]}"#);

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let err = svc
        .load(ProfileType::File, "logs", "recent", false)
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "pattern", .. }));
}

#[test]
fn missing_profile_is_not_found() {
    let tier = TempDir::new().unwrap();
    let svc = service(vec![(&tier, Tier::Bundled)]);
    let err = svc.load(ProfileType::Http, "api", "nope", false).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn malformed_json_is_reported() {
    let tier = TempDir::new().unwrap();
    write_profile(tier.path(), "http/api/users.json", "{broken");

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let err = svc.load(ProfileType::Http, "api", "users", false).unwrap_err();
    assert!(matches!(err, Error::Malformed { .. }));
}

#[test]
fn higher_tier_shadows_lower() {
    let project = TempDir::new().unwrap();
    let bundled = TempDir::new().unwrap();
    write_profile(
        project.path(),
        "http/api/users.json",
        r#"{"base_url": "https://project.example.com"}"#,
    );
    write_profile(
        bundled.path(),
        "http/api/users.json",
        r#"{"base_url": "https://bundled.example.com"}"#,
    );

    let svc = service(vec![(&project, Tier::Project), (&bundled, Tier::Bundled)]);
    let profile = svc.load(ProfileType::Http, "api", "users", false).unwrap();

    assert_eq!(profile.tier, Tier::Project);
    assert_eq!(profile.doc["base_url"], "https://project.example.com");
}

#[test]
fn listing_merges_tiers_and_skips_meta_files() {
    let project = TempDir::new().unwrap();
    let bundled = TempDir::new().unwrap();
    write_profile(project.path(), "http/api/users.json", r#"{"base_url": "https://p"}"#);
    write_profile(bundled.path(), "http/api/users.json", r#"{"base_url": "https://b"}"#);
    write_profile(bundled.path(), "http/api/orders.json", r#"{"base_url": "https://b"}"#);
    write_profile(bundled.path(), "http/api/_meta.json", r#"{"base_url": "https://b"}"#);

    let svc = service(vec![(&project, Tier::Project), (&bundled, Tier::Bundled)]);
    let entries = svc.list(ProfileType::Http);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "orders");
    assert_eq!(entries[0].tier, Tier::Bundled);
    assert_eq!(entries[1].name, "users");
    assert_eq!(entries[1].tier, Tier::Project);
}

#[test]
fn cascade_prefers_http_then_duckdb_then_file() {
    let tier = TempDir::new().unwrap();
    write_profile(tier.path(), "duckdb/data/report.sql", "SELECT 1;");
    write_profile(tier.path(), "file/data/report.json", r#"{"pattern": "*.jsonl"}"#);

    let svc = service(vec![(&tier, Tier::Bundled)]);
    let (ty, _, _) = svc.locate_any("data", "report").unwrap();
    assert_eq!(ty, ProfileType::Duckdb);

    write_profile(tier.path(), "http/data/report.json", r#"{"base_url": "https://h"}"#);
    let (ty, _, _) = svc.locate_any("data", "report").unwrap();
    assert_eq!(ty, ProfileType::Http);
}

#[test]
fn meta_only_directory_lists_nothing() {
    let tier = TempDir::new().unwrap();
    write_profile(tier.path(), "http/api/_meta.json", r#"{"base_url": "https://h"}"#);

    let svc = service(vec![(&tier, Tier::Bundled)]);
    assert!(svc.list(ProfileType::Http).is_empty());
    assert!(svc.locate_any("api", "_meta").is_none());
}

#[test]
fn scenario_http_profile_full_composition() {
    // base_url + path + substituted header, the way the resolver consumes it
    let tier = TempDir::new().unwrap();
    write_profile(
        tier.path(),
        "http/api/users.json",
        r#"{"base_url": "https://api.example.com", "path": "/v1/users", "headers": {"Auth": "${JN_TEST_TOKEN_C}"}}"#,
    );

    unsafe { std::env::set_var("JN_TEST_TOKEN_C", "abc") };
    let svc = service(vec![(&tier, Tier::Bundled)]);
    let profile = svc.load(ProfileType::Http, "api", "users", true).unwrap();

    let base = profile.doc["base_url"].as_str().unwrap();
    let path = profile.doc["path"].as_str().unwrap();
    let url = format!("{}{}?{}", base, path, "limit=5");
    assert_eq!(url, "https://api.example.com/v1/users?limit=5");
    assert_eq!(profile.doc["headers"]["Auth"], "abc");
}
