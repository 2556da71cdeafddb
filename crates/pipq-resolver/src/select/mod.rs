//! Release selection against version constraints.
//!
//! Picks the newest release that satisfies a constraint set, scanning in
//! descending version order and skipping pre-releases unless they were
//! asked for.

use pipq_core::error::{PipqError, PipqResult};
use pipq_core::{AnyVersion, Constraint};

/// Selector over a package's available releases
#[derive(Debug, Clone)]
pub struct ReleaseSelector {
    /// Available versions sorted in descending order
    available: Vec<AnyVersion>,
}

impl ReleaseSelector {
    /// Create a selector; the input order does not matter
    pub fn new(mut versions: Vec<AnyVersion>) -> Self {
        versions.sort_by(|a, b| b.cmp(a));
        Self {
            available: versions,
        }
    }

    /// Number of available releases
    pub fn len(&self) -> usize {
        self.available.len()
    }

    /// True when the package has no releases at all
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// Latest release satisfying every constraint, or `None` when nothing
    /// fits.
    ///
    /// Legacy-form releases can never satisfy a structured constraint, so
    /// the incompatible-comparison error is treated as a miss here rather
    /// than aborting the scan; other evaluation errors propagate.
    pub fn latest_matching(
        &self,
        constraints: &[Constraint],
        allow_prereleases: bool,
    ) -> PipqResult<Option<&AnyVersion>> {
        for version in &self.available {
            if !allow_prereleases && version.is_prerelease() {
                continue;
            }
            if constraints.is_empty() {
                return Ok(Some(version));
            }
            match version.fits_constraints(constraints) {
                Ok(true) => return Ok(Some(version)),
                Ok(false) => {},
                Err(PipqError::IncompatibleVersionComparison { .. }) => {},
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}
