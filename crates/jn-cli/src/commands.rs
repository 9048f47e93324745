use crate::args::{CacheCommand, Cli, Commands, PluginCommand, ProfileCommand};
use crate::handlers;
use anyhow::Result;
use clap::CommandFactory;
use jn_runtime::{Config, Paths};

pub fn run(cli: Cli) -> Result<i32> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(0);
    };

    let paths = Paths::resolve(cli.root.as_deref(), cli.project_root.as_deref())?;
    let config = Config::load(&paths)?;

    match command {
        Commands::Cat(args) => handlers::cat::handle(&paths, &config, args),

        Commands::Plugin { command } => {
            match command {
                PluginCommand::List { address, mode } => {
                    handlers::plugin::handle_list(&paths, &config, address.as_deref(), &mode)?
                }
                PluginCommand::Scan => handlers::plugin::handle_scan(&paths, &config)?,
            }
            Ok(0)
        }

        Commands::Cache { command } => {
            match command {
                CacheCommand::Clear => handlers::cache::handle_clear(&paths),
            }
            Ok(0)
        }

        Commands::Profile { command } => {
            match command {
                ProfileCommand::List { profile_type } => {
                    handlers::profile::handle_list(&paths, profile_type.as_deref())?
                }
                ProfileCommand::Show { reference } => {
                    handlers::profile::handle_show(&paths, &reference)?
                }
            }
            Ok(0)
        }
    }
}
