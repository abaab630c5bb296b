//! Library version announced in the connection handshake.

/// Major version; peers must agree on it.
#[must_use]
pub fn version_major() -> i64 {
    env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0)
}

/// Minor version; a mismatch is only reported.
#[must_use]
pub fn version_minor() -> i64 {
    env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0)
}

/// `major.minor`
#[must_use]
pub fn version_string() -> String {
    format!("{}.{}", version_major(), version_minor())
}
