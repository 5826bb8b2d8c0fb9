//! Common code used by the dualstack-ipam binary

pub mod logging;
pub mod prefix;
