//! Turns a raw network config into a resolved, dual-stack [`IpamConfig`]

use std::net::IpAddr;

use ipnet::IpNet;

use crate::{
    args::EnvArgs,
    config::{IpamConfig, NetworkConfig, Route},
    error::{Error, Result},
    overlap::check_overlaps,
    range::{Range, RangeSet},
    version,
};

/// IPv6 prefix used when the config does not name one
pub const DEFAULT_IPV6_PREFIX: &str = "2001:db8::/32";

/// A fully resolved IPAM config and the CNI version it was written against
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub cni_version: String,
    pub ipam: IpamConfig,
}

/// Resolve the IPAM config in a network config document.
///
/// `env_args` is the `CNI_ARGS` string for this invocation (empty if there is none).
/// Either every step succeeds or nothing is returned.
pub fn load_ipam_config(bytes: &[u8], env_args: &str) -> Result<ResolvedConfig> {
    let NetworkConfig {
        name,
        cni_version,
        ipam,
        args,
    } = serde_json::from_slice(bytes)?;
    let section = ipam.ok_or(Error::MissingIpam)?;
    log::debug!("Resolving IPAM config for network {:?} (CNI {:?})", name, cni_version);

    // Requested addresses come from CNI_ARGS first, then the config's own args
    let mut ip_args: Vec<IpAddr> = EnvArgs::parse(env_args)?.ip.into_iter().collect();
    for ip in args.and_then(|args| args.cni).map(|cni| cni.ips).unwrap_or_default() {
        let addr: IpAddr = ip.parse().map_err(|_| Error::InvalidAddress(ip))?;
        ip_args.push(addr.to_canonical());
    }

    let mut ipam = section.promote_legacy();
    ipam.ip_args = ip_args;
    if ipam.ranges.is_empty() {
        return Err(Error::NoRanges);
    }

    for (index, range_set) in ipam.ranges.iter_mut().enumerate() {
        range_set
            .canonicalize()
            .map_err(|source| Error::InvalidRangeSet { index, source })?;
    }

    // CNI 0.2.0 and below support only one address per family, and the IPv6 one is ours to assign
    let num_v4 = ipam.ranges.iter().filter(|set| set.is_ipv4()).count();
    let num_v6 = ipam.ranges.len() - num_v4;
    if (num_v4 > 1 || num_v6 > 0) && version::is_legacy(&cni_version) {
        return Err(Error::VersionIncompatible(cni_version));
    }

    let prefix = match ipam.ipv6.as_deref() {
        Some(prefix) => prefix,
        None => {
            log::debug!("No IPv6 prefix configured. Using {}", DEFAULT_IPV6_PREFIX);
            DEFAULT_IPV6_PREFIX
        }
    };
    let prefix: IpNet = prefix
        .parse()
        .map_err(|_| Error::InvalidPrefix(prefix.to_string()))?;
    ipam.ipv6 = Some(prefix.to_string());

    // Derive the IPv6 range from the first IPv4 range set. The subnet address is
    // embedded as written, host bits included.
    let ipv4_net = ipam
        .ranges
        .iter()
        .find_map(|set| match set.first()?.subnet {
            IpNet::V4(net) => Some(net.addr()),
            IpNet::V6(_) => None,
        })
        .ok_or(Error::NoIpv4Range)?;
    let pod = ipv4_net.octets()[2];
    let subnet = pod6::synthesize_ip(prefix.addr(), IpAddr::V4(ipv4_net), pod)?;
    log::debug!("Synthesized IPv6 subnet {} from {} (pod {})", subnet, ipv4_net, pod);

    let mut ipv6_set = RangeSet::from(Range::new(IpNet::V6(subnet)));
    ipv6_set
        .canonicalize()
        .map_err(|source| Error::InvalidRangeSet {
            index: ipam.ranges.len(),
            source,
        })?;
    ipam.ranges.push(ipv6_set);

    // The gateway is left to whoever brings the interface up
    ipam.routes.push(Route::default_ipv6());

    check_overlaps(&ipam.ranges)?;

    // Copy the network name in so the IPAM config can travel on its own
    ipam.name = name;
    log::trace!("Resolved IPAM config: {:?}", ipam);

    Ok(ResolvedConfig { cni_version, ipam })
}
