//! Network config document types
//!
//! [`NetworkConfig`] and [`IpamSection`] mirror the JSON handed to an IPAM plugin.
//! [`IpamConfig`] is the resolved form, which never carries the deprecated
//! single-range fields.

use std::net::{IpAddr, Ipv6Addr};

use ipnet::{IpNet, Ipv6Net};

use crate::range::{Range, RangeSet};

/// The top-level network config, just so we can get the IPAM block
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Network name
    #[serde(default)]
    pub name: String,
    /// CNI protocol version the document is written against
    #[serde(default)]
    pub cni_version: String,
    /// Address management section
    pub ipam: Option<IpamSection>,
    /// Per-invocation arguments
    #[serde(default)]
    pub args: Option<NetworkArgs>,
}

/// The `args` object of a network config
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct NetworkArgs {
    #[serde(default)]
    pub cni: Option<IpamArgs>,
}

/// The `args.cni` object of a network config
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct IpamArgs {
    /// Explicitly requested addresses. Kept as strings so bad entries surface as address errors.
    #[serde(default)]
    pub ips: Vec<String>,
}

/// The deprecated single-range form, written directly inside `ipam`
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRange {
    #[serde(default)]
    pub range_start: Option<IpAddr>,
    #[serde(default)]
    pub range_end: Option<IpAddr>,
    #[serde(default)]
    pub subnet: Option<IpNet>,
    #[serde(default)]
    pub gateway: Option<IpAddr>,
}

impl LegacyRange {
    /// Convert to a [`Range`]. Without a subnet, the legacy fields are ignored entirely.
    #[must_use]
    pub fn into_range(self) -> Option<Range> {
        self.subnet.map(|subnet| Range {
            range_start: self.range_start,
            range_end: self.range_end,
            subnet,
            gateway: self.gateway,
        })
    }
}

/// The `ipam` section as written in a network config
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpamSection {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub legacy: LegacyRange,
    #[serde(default)]
    pub ranges: Vec<RangeSet>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub data_dir: String,
    #[serde(default)]
    pub resolv_conf: String,
    /// Prefix to synthesize the IPv6 range from
    #[serde(default)]
    pub ipv6: Option<String>,
}

impl IpamSection {
    /// Fold the legacy range (if any) into the front of the range set list
    #[must_use]
    pub fn promote_legacy(self) -> IpamConfig {
        let mut ranges = self.ranges;
        if let Some(range) = self.legacy.into_range() {
            log::debug!("Promoting legacy range on {} to range set 0", range.subnet);
            ranges.insert(0, RangeSet::from(range));
        }

        IpamConfig {
            name: String::new(),
            kind: self.kind,
            routes: self.routes,
            data_dir: self.data_dir,
            resolv_conf: self.resolv_conf,
            ranges,
            ip_args: Vec::new(),
            ipv6: self.ipv6,
        }
    }
}

/// A resolved IPAM config
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpamConfig {
    /// Copied from the network name so this config is self-contained
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub routes: Vec<Route>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data_dir: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resolv_conf: String,
    pub ranges: Vec<RangeSet>,
    /// Requested addresses from `CNI_ARGS` and `args`
    #[serde(skip)]
    pub ip_args: Vec<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
}

/// A route to install alongside the assigned addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Route {
    pub dst: IpNet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw: Option<IpAddr>,
}

impl Route {
    /// The IPv6 default route (`::/0`) with no gateway
    #[must_use]
    pub fn default_ipv6() -> Self {
        Self {
            dst: IpNet::V6(Ipv6Net::new_assert(Ipv6Addr::UNSPECIFIED, 0)),
            gw: None,
        }
    }
}
