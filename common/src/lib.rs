//! SkyArchive Common Types
//!
//! Shared types used by the SkyArchive rate service: currency codes and the
//! reporting allow-list, country to currency resolution, and time helpers.

pub mod currency;
pub mod geo;
pub mod error;
pub mod time;

pub use currency::*;
pub use geo::*;
pub use error::*;
pub use time::*;
