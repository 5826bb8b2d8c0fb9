#![doc = include_str!("../README.md")]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod error;
mod synthesize;
mod decompose;
pub use decompose::{decompose, decompose_ip};
pub use error::Error;
pub use synthesize::{synthesize, synthesize_ip};

/// Prefix length of every synthesized network
pub const SYNTHESIZED_PREFIX_LEN: u8 = 64;

/// Number of leading prefix bytes copied verbatim into a synthesized address (a /56)
pub const NETWORK_OCTETS: usize = 7;

/// Offset of the pod number within a synthesized address
pub const POD_OCTET: usize = 7;

/// Offset of the embedded IPv4 address within a synthesized address
pub const HOST_OFFSET: usize = 12;
