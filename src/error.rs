use crate::range::RangeError;

/// All possible errors thrown while resolving an IPAM config
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to decode network config: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IPAM config missing 'ipam' key")]
    MissingIpam,
    #[error("ARGS: invalid pair {0:?}")]
    MalformedArgs(String),
    #[error("ARGS: unknown args {0:?}")]
    UnknownArgs(Vec<String>),
    #[error("Cannot understand IP address {0:?}")]
    InvalidAddress(String),
    #[error("Cannot understand IPv6 prefix {0:?}")]
    InvalidPrefix(String),
    #[error("No IP ranges specified")]
    NoRanges,
    #[error("Invalid range set {index}: {source}")]
    InvalidRangeSet {
        index: usize,
        #[source]
        source: RangeError,
    },
    #[error("CNI version {0:?} does not support more than 1 address per family")]
    VersionIncompatible(String),
    #[error("No IPv4 range set to derive the IPv6 range from")]
    NoIpv4Range,
    #[error("Range set {first} overlaps with {second}")]
    RangeOverlap { first: usize, second: usize },
    #[error(transparent)]
    MalformedAddress(#[from] pod6::Error),
}

/// Result type for `dualstack-ipam`
pub type Result<T> = std::result::Result<T, Error>;
