//! CNI protocol version families

/// Versions from before a network could carry more than one address per family.
///
/// An unset `cniVersion` is treated as the oldest version.
pub const LEGACY_VERSIONS: [&str; 3] = ["", "0.1.0", "0.2.0"];

/// Check if a `cniVersion` string belongs to the legacy family
#[must_use]
pub fn is_legacy(version: &str) -> bool {
    LEGACY_VERSIONS.contains(&version)
}
