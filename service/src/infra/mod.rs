//! Infrastructure layer.

pub mod database;
pub mod geocoder;

pub use self::{database::Database, geocoder::Geocoder};
#[cfg(any(test, feature = "memory"))]
pub use self::database::{memory, Memory};
#[cfg(feature = "nominatim")]
pub use self::geocoder::{nominatim, Nominatim};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
