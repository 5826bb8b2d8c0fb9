//! # Dual-stack IPAM library
//!
//! *Note: There is a fair chance you are looking for `src/dualstack-ipam.rs` instead of this file.*
//!
//! Resolves the `ipam` section of a CNI network config. Every IPv4 pool is
//! paired with an IPv6 `/64` derived from it by [`pod6::synthesize`], so no
//! separate IPv6 allocation state is needed.

#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod args;
pub mod config;
mod error;
pub mod overlap;
pub mod range;
pub mod resolve;
pub mod version;

pub use error::{Error, Result};
pub use resolve::{load_ipam_config, ResolvedConfig, DEFAULT_IPV6_PREFIX};
