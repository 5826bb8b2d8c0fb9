//! Address ranges and range sets

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    ops::Deref,
};

use ipnet::IpNet;

/// Reasons a single range or range set is unusable
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum RangeError {
    #[error("Empty range set")]
    EmptySet,
    #[error("Mixed address families in range set")]
    MixedFamilies,
    #[error("Network {0} too small to allocate from")]
    NetworkTooSmall(IpNet),
    #[error("Range start {start} is after range end {end}")]
    StartAfterEnd { start: IpAddr, end: IpAddr },
    #[error("Range {field} {addr} is not in network {subnet}")]
    OutsideSubnet {
        field: &'static str,
        addr: IpAddr,
        subnet: IpNet,
    },
    #[error("Subnets {0} and {1} overlap")]
    Overlap(IpNet, IpNet),
}

/// An inclusive interval of addresses within a subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    /// The first address, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_start: Option<IpAddr>,
    /// The last address, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_end: Option<IpAddr>,
    pub subnet: IpNet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<IpAddr>,
}

impl Range {
    /// Construct a range spanning all usable addresses of `subnet`
    #[must_use]
    pub fn new(subnet: IpNet) -> Self {
        Self {
            range_start: None,
            range_end: None,
            subnet,
            gateway: None,
        }
    }

    /// Check if this range holds IPv4 addresses
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        matches!(self.subnet, IpNet::V4(_))
    }

    /// Fill in any missing bounds, then make sure the range is well-formed
    pub fn canonicalize(&mut self) -> Result<(), RangeError> {
        // IPv4-mapped IPv6 addresses are treated as plain IPv4
        self.range_start = self.range_start.map(|addr| addr.to_canonical());
        self.range_end = self.range_end.map(|addr| addr.to_canonical());
        self.gateway = self.gateway.map(|addr| addr.to_canonical());

        let (first, last) = usable_bounds(&self.subnet)?;
        let start = *self.range_start.get_or_insert(first);
        let end = *self.range_end.get_or_insert(last);

        self.check_contains("start", start)?;
        self.check_contains("end", end)?;
        if let Some(gateway) = self.gateway {
            self.check_contains("gateway", gateway)?;
        }

        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }

        Ok(())
    }

    /// The effective `(start, end)` of this range, whether or not it has been canonicalized
    #[must_use]
    pub fn bounds(&self) -> Option<(IpAddr, IpAddr)> {
        let defaults = usable_bounds(&self.subnet).ok();
        Some((
            self.range_start.or(defaults.map(|(first, _)| first))?,
            self.range_end.or(defaults.map(|(_, last)| last))?,
        ))
    }

    /// Check if any address falls in both ranges
    #[must_use]
    pub fn overlaps(&self, other: &Range) -> bool {
        // Ranges of different families never overlap
        if self.is_ipv4() != other.is_ipv4() {
            return false;
        }

        match (self.bounds(), other.bounds()) {
            (Some((start, end)), Some((other_start, other_end))) => {
                start <= other_end && other_start <= end
            }
            _ => false,
        }
    }

    fn check_contains(&self, field: &'static str, addr: IpAddr) -> Result<(), RangeError> {
        if self.subnet.contains(&addr) {
            Ok(())
        } else {
            Err(RangeError::OutsideSubnet {
                field,
                addr,
                subnet: self.subnet,
            })
        }
    }
}

/// Get the first and last addresses in `subnet` that may be handed out.
///
/// The network address is always skipped. For IPv4 the broadcast address is skipped as well.
fn usable_bounds(subnet: &IpNet) -> Result<(IpAddr, IpAddr), RangeError> {
    // Can't allocate from a network with no addresses, eg a /32 or /31
    if subnet.prefix_len() + 2 > subnet.max_prefix_len() {
        return Err(RangeError::NetworkTooSmall(*subnet));
    }

    Ok(match subnet {
        IpNet::V4(net) => (
            IpAddr::V4(Ipv4Addr::from(u32::from(net.network()) + 1)),
            IpAddr::V4(Ipv4Addr::from(u32::from(net.broadcast()) - 1)),
        ),
        IpNet::V6(net) => (
            IpAddr::V6(Ipv6Addr::from(u128::from(net.network()) + 1)),
            IpAddr::V6(net.broadcast()),
        ),
    })
}

/// A non-contiguous pool of addresses, all in one family
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RangeSet(Vec<Range>);

impl RangeSet {
    /// Canonicalize every range, then make sure they agree on family and do not overlap
    pub fn canonicalize(&mut self) -> Result<(), RangeError> {
        let is_ipv4 = self.0.first().ok_or(RangeError::EmptySet)?.is_ipv4();

        for range in &mut self.0 {
            if range.is_ipv4() != is_ipv4 {
                return Err(RangeError::MixedFamilies);
            }
            range.canonicalize()?;
        }

        for (i, range) in self.0.iter().enumerate() {
            if let Some(other) = self.0[i + 1..].iter().find(|other| range.overlaps(other)) {
                return Err(RangeError::Overlap(range.subnet, other.subnet));
            }
        }

        Ok(())
    }

    /// Classify this set by the family of its first range
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        self.0.first().is_some_and(Range::is_ipv4)
    }

    /// Check if any range in this set overlaps any range in `other`
    #[must_use]
    pub fn overlaps(&self, other: &RangeSet) -> bool {
        self.0
            .iter()
            .any(|range| other.0.iter().any(|other| range.overlaps(other)))
    }
}

impl Deref for RangeSet {
    type Target = [Range];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Range> for RangeSet {
    fn from(range: Range) -> Self {
        Self(vec![range])
    }
}

impl From<Vec<Range>> for RangeSet {
    fn from(ranges: Vec<Range>) -> Self {
        Self(ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(subnet: &str) -> Range {
        Range::new(subnet.parse().unwrap())
    }

    fn bounded(subnet: &str, start: &str, end: &str) -> Range {
        Range {
            range_start: Some(start.parse().unwrap()),
            range_end: Some(end.parse().unwrap()),
            ..range(subnet)
        }
    }

    #[test]
    fn test_ipv4_defaults() {
        let mut r = range("192.168.1.0/24");
        r.canonicalize().unwrap();
        assert_eq!(r.range_start, Some("192.168.1.1".parse().unwrap()));
        assert_eq!(r.range_end, Some("192.168.1.254".parse().unwrap()));
        assert_eq!(r.gateway, None);
    }

    #[test]
    fn test_ipv6_defaults() {
        let mut r = range("2001:db8:0:fe::af0:1e00/64");
        r.canonicalize().unwrap();
        assert_eq!(r.range_start, Some("2001:db8:0:fe::1".parse().unwrap()));
        assert_eq!(
            r.range_end,
            Some("2001:db8:0:fe:ffff:ffff:ffff:ffff".parse().unwrap())
        );

        // Host bits in the subnet are kept
        assert_eq!(r.subnet.to_string(), "2001:db8:0:fe::af0:1e00/64");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let mut r = Range {
            gateway: Some("10.0.0.1".parse().unwrap()),
            ..range("10.0.0.0/16")
        };
        r.canonicalize().unwrap();
        let once = r;
        r.canonicalize().unwrap();
        assert_eq!(r, once);

        let mut set = RangeSet::from(vec![
            bounded("10.1.0.0/24", "10.1.0.10", "10.1.0.20"),
            range("10.2.0.0/24"),
        ]);
        set.canonicalize().unwrap();
        let once = set.clone();
        set.canonicalize().unwrap();
        assert_eq!(set, once);
    }

    #[test]
    fn test_start_after_end() {
        assert_eq!(
            bounded("10.0.0.0/24", "10.0.0.50", "10.0.0.40").canonicalize(),
            Err(RangeError::StartAfterEnd {
                start: "10.0.0.50".parse().unwrap(),
                end: "10.0.0.40".parse().unwrap(),
            })
        );
    }

    #[test]
    fn test_bounds_outside_subnet() {
        assert!(matches!(
            bounded("10.0.0.0/24", "10.0.1.5", "10.0.1.6").canonicalize(),
            Err(RangeError::OutsideSubnet { field: "start", .. })
        ));
        assert!(matches!(
            bounded("10.0.0.0/24", "10.0.0.5", "10.0.1.6").canonicalize(),
            Err(RangeError::OutsideSubnet { field: "end", .. })
        ));

        // A bound from the wrong family is never in the subnet
        assert!(matches!(
            bounded("10.0.0.0/24", "2001:db8::1", "10.0.0.6").canonicalize(),
            Err(RangeError::OutsideSubnet { field: "start", .. })
        ));
    }

    #[test]
    fn test_mapped_bounds_are_ipv4() {
        let mut r = Range {
            gateway: Some("::ffff:10.0.0.1".parse().unwrap()),
            ..bounded("10.0.0.0/24", "::ffff:10.0.0.5", "::ffff:10.0.0.50")
        };
        r.canonicalize().unwrap();
        assert_eq!(r.range_start, Some("10.0.0.5".parse().unwrap()));
        assert_eq!(r.range_end, Some("10.0.0.50".parse().unwrap()));
        assert_eq!(r.gateway, Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_gateway_outside_subnet() {
        let mut r = Range {
            gateway: Some("10.9.0.1".parse().unwrap()),
            ..range("10.0.0.0/24")
        };
        assert!(matches!(
            r.canonicalize(),
            Err(RangeError::OutsideSubnet { field: "gateway", .. })
        ));
    }

    #[test]
    fn test_network_too_small() {
        for subnet in ["10.0.0.0/31", "10.0.0.1/32", "2001:db8::/127", "2001:db8::1/128"] {
            assert_eq!(
                range(subnet).canonicalize(),
                Err(RangeError::NetworkTooSmall(subnet.parse().unwrap()))
            );
        }
        range("10.0.0.0/30").canonicalize().unwrap();
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(RangeSet::default().canonicalize(), Err(RangeError::EmptySet));
    }

    #[test]
    fn test_mixed_families() {
        let mut set = RangeSet::from(vec![range("10.0.0.0/24"), range("2001:db8::/64")]);
        assert_eq!(set.canonicalize(), Err(RangeError::MixedFamilies));
    }

    #[test]
    fn test_overlap_within_set() {
        let mut set = RangeSet::from(vec![
            bounded("10.0.0.0/24", "10.0.0.10", "10.0.0.100"),
            bounded("10.0.0.0/24", "10.0.0.50", "10.0.0.200"),
        ]);
        assert!(matches!(set.canonicalize(), Err(RangeError::Overlap(_, _))));

        let mut set = RangeSet::from(vec![
            bounded("10.0.0.0/24", "10.0.0.10", "10.0.0.49"),
            bounded("10.0.0.0/24", "10.0.0.50", "10.0.0.200"),
        ]);
        set.canonicalize().unwrap();
    }

    #[test]
    fn test_range_overlaps() {
        let a = bounded("192.168.1.0/24", "192.168.1.10", "192.168.1.20");
        let b = bounded("192.168.1.0/24", "192.168.1.20", "192.168.1.30");
        let c = bounded("192.168.1.0/24", "192.168.1.21", "192.168.1.30");
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));

        // Different subnets can still share addresses
        let wide = range("192.168.0.0/16");
        assert!(wide.overlaps(&a) && a.overlaps(&wide));
    }

    #[test]
    fn test_families_never_overlap() {
        let v4 = range("0.0.0.0/0");
        let v6 = range("::/0");
        assert!(!v4.overlaps(&v6));
        assert!(!RangeSet::from(v6).overlaps(&RangeSet::from(v4)));
    }

    #[test]
    fn test_set_family() {
        assert!(RangeSet::from(range("10.0.0.0/8")).is_ipv4());
        assert!(!RangeSet::from(range("fd00::/8")).is_ipv4());
        assert!(!RangeSet::default().is_ipv4());
    }
}
