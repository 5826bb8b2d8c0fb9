use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::{error::Error, HOST_OFFSET, POD_OCTET};

/// Recovers the pod number and IPv4 address from an address built by [`synthesize`](crate::synthesize())
#[must_use]
pub fn decompose(ipv6_addr: Ipv6Addr) -> (u8, Ipv4Addr) {
    let octets = ipv6_addr.octets();
    (
        octets[POD_OCTET],
        Ipv4Addr::new(
            octets[HOST_OFFSET],
            octets[HOST_OFFSET + 1],
            octets[HOST_OFFSET + 2],
            octets[HOST_OFFSET + 3],
        ),
    )
}

/// Like [`decompose`], but fails if handed an IPv4 address
pub fn decompose_ip(addr: IpAddr) -> Result<(u8, Ipv4Addr), Error> {
    match addr {
        IpAddr::V6(addr) => Ok(decompose(addr)),
        IpAddr::V4(_) => Err(Error::malformed(addr, 16)),
    }
}
