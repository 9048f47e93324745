use crate::pattern::match_pattern;
use jn_types::{Mode, PluginInfo, Role};

/// A plugin that matched an address, with the pattern and score that won
#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub plugin: &'a PluginInfo,
    pub pattern: &'a str,
    pub score: u32,
}

/// In-memory plugin catalog.
///
/// Append-only: populated once from cache or discovery, then queried.
/// Duplicate names are retained so diagnostic listings stay honest; lookup
/// resolves them by score with first-seen order breaking ties.
pub struct Registry {
    plugins: Vec<PluginInfo>,
}

impl Registry {
    pub fn new(plugins: Vec<PluginInfo>) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &[PluginInfo] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// The best plugin for `address` among those supporting `mode`
    pub fn find(&self, address: &str, mode: Mode) -> Option<&PluginInfo> {
        let mut best: Option<(&PluginInfo, u32)> = None;
        for plugin in &self.plugins {
            if !plugin.supports(mode) {
                continue;
            }
            if let Some((_, score)) = best_pattern(plugin, address)
                && best.is_none_or(|(_, s)| score > s)
            {
                best = Some((plugin, score));
            }
        }
        best.map(|(plugin, _)| plugin)
    }

    /// Like [`Registry::find`], but restricted to plugins of the given
    /// roles. Keeps a format pattern like `.*\.csv$` from hijacking a URL
    /// that merely ends in `.csv`, and vice versa.
    pub fn find_in_roles(&self, address: &str, mode: Mode, roles: &[Role]) -> Option<&PluginInfo> {
        let mut best: Option<(&PluginInfo, u32)> = None;
        for plugin in &self.plugins {
            if !roles.contains(&plugin.role) || !plugin.supports(mode) {
                continue;
            }
            if let Some((_, score)) = best_pattern(plugin, address)
                && best.is_none_or(|(_, s)| score > s)
            {
                best = Some((plugin, score));
            }
        }
        best.map(|(plugin, _)| plugin)
    }

    /// Every matching plugin, sorted by descending score (stable, so
    /// first-seen order is preserved among equals)
    pub fn find_all(&self, address: &str, mode: Mode) -> Vec<Match<'_>> {
        let mut matches: Vec<Match<'_>> = self
            .plugins
            .iter()
            .filter(|p| p.supports(mode))
            .filter_map(|p| {
                best_pattern(p, address).map(|(pattern, score)| Match {
                    plugin: p,
                    pattern,
                    score,
                })
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }

    /// Select a plugin by its declared name, preferring higher tiers
    pub fn find_by_name(&self, name: &str, mode: Mode) -> Option<&PluginInfo> {
        let mut best: Option<(&PluginInfo, u32)> = None;
        for plugin in &self.plugins {
            if plugin.name != name || !plugin.supports(mode) {
                continue;
            }
            let score = plugin.tier.score() + plugin.language.score();
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((plugin, score));
            }
        }
        best.map(|(plugin, _)| plugin)
    }

    /// Resolve a format name (e.g. `csv`) to a plugin: exact name first,
    /// then any format plugin whose patterns claim a file with that
    /// extension
    pub fn find_for_format(&self, format: &str, mode: Mode) -> Option<&PluginInfo> {
        self.find_by_name(format, mode)
            .or_else(|| self.find_in_roles(&format!("x.{}", format), mode, &[Role::Format]))
    }

    /// Plugin declaring a profile type (e.g. the duckdb driver)
    pub fn find_by_profile_type(&self, profile_type: &str, mode: Mode) -> Option<&PluginInfo> {
        let mut best: Option<(&PluginInfo, u32)> = None;
        for plugin in &self.plugins {
            if plugin.profile_type.as_deref() != Some(profile_type) || !plugin.supports(mode) {
                continue;
            }
            let score = plugin.tier.score() + plugin.language.score();
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((plugin, score));
            }
        }
        best.map(|(plugin, _)| plugin)
    }

    /// Decompressor for a compression tag, by role and name
    pub fn find_compression(&self, name: &str) -> Option<&PluginInfo> {
        let mut best: Option<(&PluginInfo, u32)> = None;
        for plugin in &self.plugins {
            if plugin.role != Role::Compression || plugin.name != name {
                continue;
            }
            if !plugin.supports(Mode::Raw) && !plugin.supports(Mode::Read) {
                continue;
            }
            let score = plugin.tier.score() + plugin.language.score();
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((plugin, score));
            }
        }
        best.map(|(plugin, _)| plugin)
    }
}

/// Best-scoring pattern of one plugin against one address
fn best_pattern<'a>(plugin: &'a PluginInfo, address: &str) -> Option<(&'a str, u32)> {
    let mut best: Option<(&str, u32)> = None;
    for pattern in &plugin.matches {
        if let Some(len) = match_pattern(pattern, address) {
            let score = plugin.tier.score() + plugin.language.score() + len as u32;
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((pattern, score));
            }
        }
    }
    best
}
