//! Endpoint-family selection with a one-way fallback.

use samgov_api::{ApiVersion, EndpointSet};

/// Holds both endpoint families and the one currently in use.
///
/// The active family starts as [`ApiVersion::Primary`] and can move to
/// [`ApiVersion::Secondary`] exactly once. There is no way back.
#[derive(Debug, Clone)]
pub struct EndpointRouter {
    primary: EndpointSet,
    secondary: EndpointSet,
    active: ApiVersion,
}

impl EndpointRouter {
    pub fn new(primary_base: &str, secondary_base: &str) -> Self {
        Self {
            primary: EndpointSet::for_version(ApiVersion::Primary, primary_base),
            secondary: EndpointSet::for_version(ApiVersion::Secondary, secondary_base),
            active: ApiVersion::Primary,
        }
    }

    pub fn active(&self) -> &EndpointSet {
        match self.active {
            ApiVersion::Primary => &self.primary,
            ApiVersion::Secondary => &self.secondary,
        }
    }

    pub fn version(&self) -> ApiVersion {
        self.active
    }

    pub fn has_switched(&self) -> bool {
        self.active == ApiVersion::Secondary
    }

    /// Moves to the secondary family. Returns `false` if already there.
    pub fn switch_version(&mut self) -> bool {
        if self.has_switched() {
            return false;
        }
        tracing::warn!(
            "Switching endpoint family from {} to {}",
            self.active,
            ApiVersion::Secondary
        );
        self.active = ApiVersion::Secondary;
        true
    }
}
