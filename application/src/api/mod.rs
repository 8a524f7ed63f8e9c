//! GraphQL API definitions.

pub mod listing;
mod mutation;
mod query;
pub mod review;
pub mod scalar;
pub mod user;

pub use self::{
    listing::Listing,
    mutation::{Mutation, ToggleFavoriteResult},
    query::Query,
    review::Review,
    user::User,
};

use crate::Context;

/// GraphQL schema.
///
/// Has no subscriptions, so uses [`juniper::EmptySubscription`] over the
/// [`Context`].
pub type Schema = juniper::RootNode<
    'static,
    Query,
    Mutation,
    juniper::EmptySubscription<Context>,
>;
