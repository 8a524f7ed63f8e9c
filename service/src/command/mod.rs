//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_listing;
pub mod create_review;
pub mod create_user;
pub mod delete_listing;
pub mod delete_review;
pub mod ensure_listing_geometry;
pub mod toggle_favorite;
pub mod update_listing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_listing::CreateListing, create_review::CreateReview,
    create_user::CreateUser, delete_listing::DeleteListing,
    delete_review::DeleteReview,
    ensure_listing_geometry::EnsureListingGeometry,
    toggle_favorite::ToggleFavorite, update_listing::UpdateListing,
};
