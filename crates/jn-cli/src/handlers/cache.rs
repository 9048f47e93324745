use crate::output;
use jn_cache::PluginCache;
use jn_runtime::Paths;

pub fn handle_clear(paths: &Paths) {
    PluginCache::new(&paths.install_root).invalidate();
    output::note("Plugin cache cleared");
}
