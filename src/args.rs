//! Parsing for the out-of-band `CNI_ARGS` string
//!
//! The string is a `;`-separated list of `KEY=VALUE` pairs. Only the `IP` and
//! `IgnoreUnknown` keys mean anything here.

use std::{net::IpAddr, str::FromStr};

use crate::error::{Error, Result};

/// Arguments passed alongside the network config
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvArgs {
    /// Tolerate keys this parser does not know about
    pub ignore_unknown: bool,
    /// A specific address the caller would like to be assigned
    pub ip: Option<IpAddr>,
}

impl EnvArgs {
    /// Parse an args string. An empty string yields the defaults.
    pub fn parse(args: &str) -> Result<Self> {
        let mut parsed = Self::default();
        if args.is_empty() {
            return Ok(parsed);
        }

        let mut unknown = Vec::new();
        for pair in args.split(';') {
            let mut parts = pair.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(Error::MalformedArgs(pair.to_string()));
            };

            match key {
                // An empty value means no address was requested
                "IP" if value.is_empty() => parsed.ip = None,
                "IP" => {
                    parsed.ip = Some(
                        value
                            .parse::<IpAddr>()
                            .map_err(|_| Error::InvalidAddress(value.to_string()))?
                            .to_canonical(),
                    );
                }
                "IgnoreUnknown" => parsed.ignore_unknown = parse_bool(pair, value)?,
                _ => unknown.push(pair.to_string()),
            }
        }

        // IgnoreUnknown applies no matter where it appears in the string
        if !unknown.is_empty() && !parsed.ignore_unknown {
            return Err(Error::UnknownArgs(unknown));
        }
        log::trace!("Parsed CNI args: {:?}", parsed);

        Ok(parsed)
    }
}

impl FromStr for EnvArgs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_bool(pair: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(Error::MalformedArgs(pair.to_string())),
    }
}
