use crate::output;
use anyhow::{Result, bail};
use jn_runtime::{Config, Paths, catalog};
use jn_types::Mode;

pub fn handle_list(
    paths: &Paths,
    config: &Config,
    address: Option<&str>,
    mode_text: &str,
) -> Result<()> {
    let Some(mode) = Mode::parse(mode_text) else {
        bail!("Unknown mode '{}' (expected read, write, raw, or profiles)", mode_text);
    };
    let registry = catalog::load_catalog(paths, config, false);

    match address {
        Some(address) => {
            let matches = registry.find_all(address, mode);
            if matches.is_empty() {
                output::note(&format!("No plugins match '{}'", address));
                return Ok(());
            }
            for m in matches {
                println!(
                    "{:>5}  {:<14} {:<8} {:<7} {}",
                    m.score,
                    m.plugin.name,
                    m.plugin.tier.as_str(),
                    m.plugin.language.as_str(),
                    m.pattern
                );
            }
        }
        None => {
            if registry.is_empty() {
                output::note("No plugins installed");
                return Ok(());
            }
            for plugin in registry.plugins() {
                println!(
                    "{:<14} {:<8} {:<8} {:<7} {}",
                    plugin.name,
                    plugin.version,
                    plugin.tier.as_str(),
                    plugin.language.as_str(),
                    plugin.path.display()
                );
            }
        }
    }
    Ok(())
}

pub fn handle_scan(paths: &Paths, config: &Config) -> Result<()> {
    let registry = catalog::load_catalog(paths, config, true);
    output::note(&format!(
        "Discovered {} plugin(s); cache rewritten",
        registry.len()
    ));
    Ok(())
}
