//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A registered `User` of the platform.
#[derive(Clone, Debug, From, Into)]
pub struct User(domain::User);

/// A registered `User` of the platform.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Name of this `User`.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// IDs of the `Listing`s this `User` marked as favorite.
    ///
    /// May include IDs of already deleted `Listing`s.
    #[must_use]
    pub fn favorite_ids(&self) -> Vec<api::listing::Id> {
        let mut ids = self.0.favorites.iter().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.into_iter().map(Into::into).collect()
    }

    /// Existing `Listing`s this `User` marked as favorite.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.favorites",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn favorites(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        ctx.service()
            .execute(query::user::Favorites(self.0.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `User` was registered.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);
