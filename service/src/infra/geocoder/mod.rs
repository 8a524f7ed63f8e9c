//! [`Geocoder`]-related implementations.

#[cfg(feature = "nominatim")]
pub mod nominatim;

#[cfg(feature = "nominatim")]
pub use self::nominatim::Nominatim;

/// Geocoding operation.
///
/// Resolving a [`Geometry`] by a [`Place`] never fails: lookup failures are
/// reported as no [`Geometry`] found.
///
/// [`Geometry`]: crate::domain::listing::Geometry
/// [`Place`]: crate::domain::listing::Place
pub use common::Handler as Geocoder;
