use filetime::FileTime;
use jn_cache::PluginCache;
use jn_types::{Language, Mode, PluginInfo, Role, Tier, mtime_secs};
use tempfile::TempDir;

fn discovered_plugin(path: std::path::PathBuf) -> PluginInfo {
    let mtime = mtime_secs(&path).unwrap();
    PluginInfo {
        name: "csv".to_string(),
        version: "1.0.0".to_string(),
        matches: vec![r".*\.csv$".to_string()],
        role: Role::Format,
        modes: vec![Mode::Read, Mode::Write],
        profile_type: None,
        language: Language::Native,
        tier: Tier::Bundled,
        path,
        mtime,
    }
}

#[test]
fn touching_a_plugin_invalidates_the_whole_cache() {
    let temp = TempDir::new().unwrap();
    let exe = temp.path().join("csv");
    std::fs::write(&exe, "#!/bin/sh\n").unwrap();

    let cache = PluginCache::new(temp.path());
    let plugins = vec![discovered_plugin(exe.clone())];
    cache.store(&plugins).unwrap();
    assert!(cache.load_valid().is_some());

    // bump mtime by one second
    let recorded = mtime_secs(&exe).unwrap();
    filetime::set_file_mtime(&exe, FileTime::from_unix_time(recorded as i64 + 1, 0)).unwrap();

    assert!(!PluginCache::is_valid(&cache.load().unwrap()));
    assert!(cache.load_valid().is_none());
}

#[test]
fn one_stale_entry_invalidates_all_entries() {
    let temp = TempDir::new().unwrap();
    let fresh = temp.path().join("fresh");
    let stale = temp.path().join("stale");
    std::fs::write(&fresh, "#!/bin/sh\n").unwrap();
    std::fs::write(&stale, "#!/bin/sh\n").unwrap();

    let cache = PluginCache::new(temp.path());
    let plugins = vec![discovered_plugin(fresh), discovered_plugin(stale.clone())];
    cache.store(&plugins).unwrap();

    let recorded = mtime_secs(&stale).unwrap();
    filetime::set_file_mtime(&stale, FileTime::from_unix_time(recorded as i64 + 60, 0)).unwrap();

    assert!(cache.load_valid().is_none());
}

#[test]
fn restoring_the_recorded_mtime_restores_validity() {
    let temp = TempDir::new().unwrap();
    let exe = temp.path().join("csv");
    std::fs::write(&exe, "#!/bin/sh\n").unwrap();

    let cache = PluginCache::new(temp.path());
    let plugins = vec![discovered_plugin(exe.clone())];
    let recorded = plugins[0].mtime;
    cache.store(&plugins).unwrap();

    filetime::set_file_mtime(&exe, FileTime::from_unix_time(recorded as i64 + 5, 0)).unwrap();
    assert!(cache.load_valid().is_none());

    filetime::set_file_mtime(&exe, FileTime::from_unix_time(recorded as i64, 0)).unwrap();
    assert!(cache.load_valid().is_some());
}
