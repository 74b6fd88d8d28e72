//! Vessel lookups against the fishing-fleet census website.
//!
//! Two operations, differing in what a miss looks like:
//! - [`VesselLookup::lookup`]: every exact-name match with its CFR and status,
//!   empty on no match or failure.
//! - [`VesselLookup::lookup_single_cfr`]: one CFR string, or
//!   [`NOT_FOUND_MESSAGE`] on failure.

pub mod extract;
pub mod lookup;
pub mod matching;
pub mod output;
pub mod record;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use lookup::VesselLookup;
pub use record::{
    LookupQuery, SearchResultLink, VesselRecord, MISSING_NAME_MESSAGE, NOT_FOUND_MESSAGE,
    PLACEHOLDER,
};
