use std::str::FromStr;

use ipnet::Ipv6Net;

/// Parses an IPv6 prefix from a CLI argument
pub fn parse_ipv6_prefix(string: &str) -> Result<Ipv6Net, String> {
    Ipv6Net::from_str(string).map_err(|err| format!("{err}. Expected something like 2001:db8::/32"))
}
