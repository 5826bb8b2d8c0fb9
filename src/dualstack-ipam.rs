//! Entrypoint for the `dualstack-ipam` binary.
//!
//! Resolves CNI network configs into dual-stack IPAM configs, and converts
//! between pod IPv4 addresses and their synthesized IPv6 counterparts.

use clap::{Parser, Subcommand};
use common::{logging::enable_logger, prefix::parse_ipv6_prefix};
use dualstack_ipam::load_ipam_config;
use ipnet::Ipv6Net;
use std::{
    io::Read,
    net::{Ipv4Addr, Ipv6Addr},
    path::PathBuf,
};

mod common;

#[derive(Parser)]
#[clap(author, version, about = "Dual-stack IPAM config resolver", long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging
    #[clap(
        long,
        global = true,
        env = "DUALSTACK_IPAM_TRACE",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    trace: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize a pod's IPv6 network from its IPv4 address
    Embed {
        /// Pod IPv4 address to translate. Ex: '10.240.30.1'
        #[clap(long)]
        ipv4: Ipv4Addr,

        /// IPv6 prefix assigned. Ex: '2001:db8::/32'
        #[clap(long = "pfx", value_parser = parse_ipv6_prefix)]
        prefix: Ipv6Net,

        /// Pod number. Defaults to the third octet of the IPv4 address
        #[clap(long)]
        pod: Option<u8>,
    },
    /// Recover the pod number and IPv4 address from a synthesized IPv6 address
    Extract {
        /// Pod IPv6 address to translate. Ex: '2001:db8:0:1e::af0:1e01'
        ipv6: Ipv6Addr,
    },
    /// Resolve the IPAM section of a network config
    Resolve {
        /// Path to the network config. Read from STDIN if not set
        #[clap(short = 'c', long = "config")]
        config_file: Option<PathBuf>,

        /// Extra `KEY=VALUE;...` arguments for this invocation
        #[clap(long, env = "CNI_ARGS", default_value = "")]
        cni_args: String,
    },
}

fn read_config(config_file: Option<&PathBuf>) -> std::io::Result<Vec<u8>> {
    match config_file {
        Some(path) => std::fs::read(path).map_err(|error| {
            log::error!("Failed to read config file: {}", path.display());
            error
        }),
        None => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

pub fn main() {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    if let Err(error) = enable_logger(args.verbose, args.trace) {
        eprintln!("Failed to set up logging: {error}");
        std::process::exit(1);
    }

    match args.command {
        Command::Embed { ipv4, prefix, pod } => {
            let pod = pod.unwrap_or(ipv4.octets()[2]);
            log::debug!("Embedding {} with pod number {} into {}", ipv4, pod, prefix);
            println!("{}", pod6::synthesize(prefix.addr(), ipv4, pod));
        }
        Command::Extract { ipv6 } => {
            let (pod, ipv4) = pod6::decompose(ipv6);
            println!("IPv4: {ipv4}, Pod: {pod}");
        }
        Command::Resolve {
            config_file,
            cni_args,
        } => {
            let bytes = match read_config(config_file.as_ref()) {
                Ok(bytes) => bytes,
                Err(error) => {
                    log::error!("{}", error);
                    std::process::exit(1);
                }
            };

            let resolved = match load_ipam_config(&bytes, &cni_args) {
                Ok(resolved) => resolved,
                Err(error) => {
                    log::error!("{}", error);
                    std::process::exit(1);
                }
            };
            log::info!(
                "Resolved {} range sets for network {:?}",
                resolved.ipam.ranges.len(),
                resolved.ipam.name
            );

            match serde_json::to_string_pretty(&resolved) {
                Ok(output) => println!("{output}"),
                Err(error) => {
                    log::error!("Failed to serialize resolved config: {}", error);
                    std::process::exit(1);
                }
            }
        }
    }
}
