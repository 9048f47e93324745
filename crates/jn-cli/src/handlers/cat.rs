use crate::args::CatArgs;
use crate::output;
use anyhow::Result;
use jn_profiles::ProfileService;
use jn_runtime::{Config, Paths, ResolveOptions, Resolver, catalog, run_all};
use jn_types::{Address, Mode};

/// Exit codes curl uses for the failures worth explaining
const CURL_HTTP_ERROR: i32 = 22;
const CURL_DNS_ERROR: i32 = 6;

pub fn handle(paths: &Paths, config: &Config, args: CatArgs) -> Result<i32> {
    let mut config = config.clone();
    if let Some(timeout) = args.timeout_ms {
        config.discovery_timeout_ms = timeout;
    }

    let registry = catalog::load_catalog(paths, &config, args.refresh);
    let profiles = ProfileService::new(paths.profile_roots());
    let resolver = Resolver::new(&registry, &profiles);

    let address = Address::parse(&args.address);
    let opts = ResolveOptions {
        mode: Mode::Read,
        extra_flags: forward_flags(&args),
        headers: args.headers.clone(),
        inject_meta: args.meta,
        require_match: args.require_match,
    };

    let specs = resolver.resolve(&address, &opts)?;

    // children share our process group; they receive their own SIGINT
    let _ = ctrlc::set_handler(|| std::process::exit(130));

    let code = run_all(&specs)?;
    if code != 0 {
        explain_fetcher_exit(code, &args.address);
    }
    Ok(code)
}

fn forward_flags(args: &CatArgs) -> Vec<String> {
    let mut flags = Vec::new();
    if let Some(delimiter) = &args.delimiter {
        flags.push(format!("--delimiter={}", delimiter));
    }
    if args.no_header {
        flags.push("--no-header".to_string());
    }
    flags
}

fn explain_fetcher_exit(code: i32, address: &str) {
    match code {
        CURL_HTTP_ERROR => output::error(&format!(
            "HTTP request failed for '{}' (server returned an error status)",
            address
        )),
        CURL_DNS_ERROR => output::error(&format!("Could not resolve host for '{}'", address)),
        _ => {}
    }
}
