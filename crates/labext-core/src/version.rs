//! Version comparison for update detection.
//!
//! Registry and server versions are semver strings, but some packages publish
//! `major.minor` only. Those are normalized by appending a `.0` patch.
//!
//! # Examples
//!
//! ```
//! use labext_core::version::is_newer;
//!
//! assert!(is_newer("1.0.0", "2.0.0"));
//! assert!(is_newer("3.1", "3.1.1"));
//! assert!(!is_newer("2.0.0", "2.0.0"));
//! assert!(!is_newer("garbage", "2.0.0"));
//! ```

use crate::error::{Error, Result};

/// Parse a version string, accepting `major.minor` as `major.minor.0`.
pub fn parse_version(s: &str) -> Result<semver::Version> {
    let s = s.trim();
    if let Ok(v) = semver::Version::parse(s) {
        return Ok(v);
    }

    let with_patch = format!("{s}.0");
    semver::Version::parse(&with_patch).map_err(|source| Error::InvalidVersion {
        version: s.to_string(),
        source,
    })
}

/// Whether `latest` is strictly greater than `installed`.
///
/// Returns `false` when either side cannot be parsed.
pub fn is_newer(installed: &str, latest: &str) -> bool {
    match (parse_version(installed), parse_version(latest)) {
        (Ok(installed), Ok(latest)) => installed < latest,
        _ => false,
    }
}
