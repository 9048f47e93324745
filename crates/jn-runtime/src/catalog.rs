use crate::config::{Config, Paths};
use jn_cache::PluginCache;
use jn_plugins::{PluginDir, Registry, discover};
use jn_types::{Language, Tier};

/// Plugin directories from the tier layout plus any configured extras
fn scan_dirs(paths: &Paths, config: &Config) -> Vec<PluginDir> {
    let mut dirs = paths.plugin_dirs();
    for extra in &config.extra_plugin_dirs {
        dirs.push(PluginDir {
            root: extra.clone(),
            tier: Tier::User,
            language: Language::Native,
        });
    }
    dirs
}

/// Load the plugin catalog, preferring a fresh cache over rediscovery.
///
/// Cache problems of any kind fall back to a rescan; a failed cache write
/// after rescan is ignored (the next invocation simply rescans again).
pub fn load_catalog(paths: &Paths, config: &Config, force_rescan: bool) -> Registry {
    let cache = PluginCache::new(&paths.install_root);

    if !force_rescan
        && let Some(plugins) = cache.load_valid()
    {
        return Registry::new(plugins);
    }

    let plugins = discover(&scan_dirs(paths, config), &config.discovery_options());
    let _ = cache.store(&plugins);
    Registry::new(plugins)
}
