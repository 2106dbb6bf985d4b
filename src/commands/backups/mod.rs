//! Cloud backup commands: snapshots and restore jobs.
//!
//! Flex clusters have their own backup endpoints. Commands call the flex endpoint first and fall
//! back to the dedicated one when the API reports the cluster isn't a flex cluster.
use crate::{client::AtlasError, watchers::CLUSTER_NOT_FOUND};

pub mod restores;
pub mod snapshots;

pub const CANNOT_USE_NON_FLEX_CLUSTER_IN_FLEX_API: &str = "CANNOT_USE_NON_FLEX_CLUSTER_IN_FLEX_API";
pub const FEATURE_UNSUPPORTED: &str = "FEATURE_UNSUPPORTED";

/// Whether a flex backup endpoint failed because the cluster is a dedicated cluster.
pub fn is_dedicated_cluster_error(err: &AtlasError) -> bool {
    [
        CANNOT_USE_NON_FLEX_CLUSTER_IN_FLEX_API,
        FEATURE_UNSUPPORTED,
        CLUSTER_NOT_FOUND,
    ]
    .iter()
    .any(|code| err.has_error_code(code))
}
