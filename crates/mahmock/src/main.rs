// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! mahmock - a mock mirai-api-http WebSocket gateway.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod handlers;
mod segments;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mahmock_config::{ConfigError, MahmockConfig};

/// mahmock - a mock mirai-api-http WebSocket gateway.
#[derive(Parser, Debug)]
#[command(name = "mahmock", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway.
    Serve {
        /// Override `server.host`.
        #[arg(long)]
        host: Option<String>,
        /// Override `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load and validate configuration, then exit.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<MahmockConfig, Vec<ConfigError>> {
    match path {
        Some(path) => mahmock_config::load_and_validate_path(path),
        None => mahmock_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            mahmock_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!("mahmock: configuration OK");
            println!("  server.host   = {}", config.server.host);
            println!("  server.port   = {}", config.server.port);
            println!("  logging.level = {}", config.logging.level);
            println!(
                "  feed          = {}",
                if config.feed.enabled {
                    format!("{} events after {}ms", config.feed.count, config.feed.delay_ms)
                } else {
                    "disabled".to_string()
                }
            );
        }
        None => {
            println!("mahmock: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["mahmock", "serve", "--host", "0.0.0.0", "--port", "9000"])
            .unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn check_config_parses_with_global_config_flag() {
        let cli = Cli::try_parse_from(["mahmock", "check-config", "--config", "/tmp/m.toml"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/m.toml")));
    }
}
