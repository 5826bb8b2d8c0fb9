//! Error types for this library

use std::net::IpAddr;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("Expected a {expected}-byte address, got {addr} ({actual} bytes)")]
    MalformedAddress {
        addr: IpAddr,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    /// Build a `MalformedAddress` error for an address that should have been `expected` bytes long
    #[must_use]
    pub(crate) fn malformed(addr: IpAddr, expected: usize) -> Self {
        Self::MalformedAddress {
            addr,
            expected,
            actual: match addr {
                IpAddr::V4(_) => 4,
                IpAddr::V6(_) => 16,
            },
        }
    }
}
