//! config
//!
//! Process configuration.
//!
//! # Design
//!
//! Configuration is environment-driven so the binary deploys as a plain
//! service unit behind a reverse proxy. The listen address is also a CLI
//! flag (the flag wins; the env var feeds it via clap). Boolean toggles
//! accept `1`, `yes`, or `true`; anything else, including absence, is off.
//!
//! | Variable              | Meaning                                  | Default        |
//! |-----------------------|------------------------------------------|----------------|
//! | `FORGELINK_LISTEN`    | bind address                             | `0.0.0.0:8080` |
//! | `FORGELINK_RATELIMIT` | enable per-client rate limiting          | off            |
//! | `FORGELINK_FORWARDED` | trust `X-Forwarded-For` for client identity | off         |

use std::net::SocketAddr;

use clap::Parser;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "forgelink", version, about = "Release-asset redirect service for code forges")]
pub struct Args {
    /// Socket address to listen on.
    #[arg(long, env = "FORGELINK_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,
}

/// Resolved process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address for the HTTP listener.
    pub listen: SocketAddr,
    /// Enforce per-client request quotas on the forge routes.
    pub ratelimit: bool,
    /// Derive client identity from the last `X-Forwarded-For` hop
    /// instead of the peer socket address. Enable only behind a proxy
    /// that overwrites the header.
    pub trust_forwarded: bool,
}

impl Config {
    /// Build the configuration from parsed arguments and the environment.
    pub fn from_env(args: &Args) -> Self {
        Self {
            listen: args.listen,
            ratelimit: env_flag("FORGELINK_RATELIMIT"),
            trust_forwarded: env_flag("FORGELINK_FORWARDED"),
        }
    }

    /// A configuration suitable for tests: ephemeral listen address,
    /// limiting and forwarding off.
    pub fn for_tests() -> Self {
        Self {
            listen: "127.0.0.1:0".parse().expect("test listen address"),
            ratelimit: false,
            trust_forwarded: false,
        }
    }
}

/// Read a boolean-like environment toggle.
fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("yes") | Ok("true")
    )
}
