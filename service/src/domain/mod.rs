//! Domain definitions.

pub mod listing;
pub mod review;
pub mod user;

pub use self::{listing::Listing, review::Review, user::User};
