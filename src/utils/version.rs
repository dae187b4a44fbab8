use crate::{ProvenanceError, Result};
use semver::{Prerelease, Version};

/// A `v`-prefixed release tag such as `v1`, `v1.2` or `v1.2.3-rc.1+build.5`.
///
/// The short forms `vMAJOR` and `vMAJOR.MINOR` carry no prerelease or build
/// metadata. Build metadata is parsed for validation and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub pre: Prerelease,
}

impl TagVersion {
    pub fn parse(tag: &str) -> Result<Self> {
        let invalid = || ProvenanceError::InvalidSemver(format!("'{}'", tag));

        let body = tag.strip_prefix('v').ok_or_else(invalid)?;
        let core_end = body.find(|c| c == '-' || c == '+').unwrap_or(body.len());
        let components = body[..core_end].split('.').count();

        match components {
            3 => {
                let version = Version::parse(body).map_err(|_| invalid())?;
                Ok(Self {
                    major: version.major,
                    minor: Some(version.minor),
                    patch: Some(version.patch),
                    pre: version.pre,
                })
            }
            1 | 2 if core_end == body.len() => {
                let padded = if components == 1 {
                    format!("{}.0.0", body)
                } else {
                    format!("{}.0", body)
                };
                let version = Version::parse(&padded).map_err(|_| invalid())?;
                Ok(Self {
                    major: version.major,
                    minor: (components == 2).then_some(version.minor),
                    patch: None,
                    pre: Prerelease::EMPTY,
                })
            }
            _ => Err(invalid()),
        }
    }

    /// Whether `self` (the attested tag) satisfies `expected`.
    ///
    /// Only the components written out in `expected` are compared; omitted
    /// components on the attested side count as zero. The prerelease is
    /// compared together with the patch number.
    pub fn satisfies(&self, expected: &TagVersion) -> bool {
        if self.major != expected.major {
            return false;
        }
        if let Some(minor) = expected.minor {
            if self.minor.unwrap_or(0) != minor {
                return false;
            }
        }
        if let Some(patch) = expected.patch {
            if self.patch.unwrap_or(0) != patch || self.pre != expected.pre {
                return false;
            }
        }
        true
    }
}
