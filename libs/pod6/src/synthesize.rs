use ipnet::Ipv6Net;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::{error::Error, HOST_OFFSET, NETWORK_OCTETS, POD_OCTET, SYNTHESIZED_PREFIX_LEN};

/// Builds a pod's IPv6 network from the /56 portion of `prefix`, a pod number, and the pod's IPv4 address.
///
/// Bytes `8..12` of the result are always zero.
#[must_use]
pub fn synthesize(prefix: Ipv6Addr, ipv4_addr: Ipv4Addr, pod: u8) -> Ipv6Net {
    let prefix = prefix.octets();
    let mut octets = [0u8; 16];

    // Network portion
    octets[..NETWORK_OCTETS].copy_from_slice(&prefix[..NETWORK_OCTETS]);

    // Pod number
    octets[POD_OCTET] = pod;

    // Host portion is the IPv4 address
    octets[HOST_OFFSET..].copy_from_slice(&ipv4_addr.octets());

    Ipv6Net::new_assert(Ipv6Addr::from(octets), SYNTHESIZED_PREFIX_LEN)
}

/// Like [`synthesize`], but accepts addresses of either family.
///
/// `prefix` must be an IPv6 address. For `host`, only the low 4 bytes are used,
/// so an IPv6 host address contributes its last 32 bits.
pub fn synthesize_ip(prefix: IpAddr, host: IpAddr, pod: u8) -> Result<Ipv6Net, Error> {
    let IpAddr::V6(prefix) = prefix else {
        return Err(Error::malformed(prefix, 16));
    };

    let ipv4_addr = match host {
        IpAddr::V4(addr) => addr,
        IpAddr::V6(addr) => {
            let octets = addr.octets();
            Ipv4Addr::new(octets[12], octets[13], octets[14], octets[15])
        }
    };

    Ok(synthesize(prefix, ipv4_addr, pod))
}
