use crate::output;
use anyhow::{Result, bail};
use jn_profiles::{ProfileService, ProfileType};
use jn_runtime::Paths;
use jn_types::{Address, AddressKind};
use serde_json::Value;

pub fn handle_list(paths: &Paths, profile_type: Option<&str>) -> Result<()> {
    let service = ProfileService::new(paths.profile_roots());

    let types: Vec<ProfileType> = match profile_type {
        Some(text) => match ProfileType::parse(text) {
            Some(ty) => vec![ty],
            None => bail!("Unknown profile type '{}' (expected http, duckdb, or file)", text),
        },
        None => ProfileType::CASCADE.to_vec(),
    };

    let mut any = false;
    for ty in types {
        for entry in service.list(ty) {
            any = true;
            println!(
                "{:<7} @{}/{} ({})",
                ty.as_str(),
                entry.namespace,
                entry.name,
                entry.tier.as_str()
            );
        }
    }
    if !any {
        output::note("No profiles found");
    }
    Ok(())
}

pub fn handle_show(paths: &Paths, reference: &str) -> Result<()> {
    let address = Address::parse(reference);
    if address.kind != AddressKind::Profile {
        bail!("'{}' is not a profile reference (expected @namespace/name)", reference);
    }
    let (Some(namespace), Some(name)) = (&address.namespace, &address.name) else {
        bail!("'{}' is not a profile reference (expected @namespace/name)", reference);
    };

    let service = ProfileService::new(paths.profile_roots());
    let Some((ty, _, _)) = service.locate_any(namespace, name) else {
        bail!("Profile not found: @{}/{}", namespace, name);
    };
    let profile = service.load(ty, namespace, name, true)?;

    let mut doc = profile.doc;
    if let (Some(sql), Value::Object(map)) = (&profile.sql, &mut doc) {
        map.insert("sql".to_string(), Value::String(sql.clone()));
    }
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
