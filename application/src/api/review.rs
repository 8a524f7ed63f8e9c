//! [`Review`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A review left on a `Listing`.
#[derive(Clone, Debug, From, Into)]
pub struct Review(domain::Review);

/// A review left on a `Listing`.
#[graphql_object(context = Context)]
impl Review {
    /// Unique identifier of this `Review`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Comment of this `Review`.
    #[must_use]
    pub fn comment(&self) -> Comment {
        self.0.comment.clone().into()
    }

    /// Rating of this `Review`, from `1` to `5` stars.
    #[must_use]
    pub fn rating(&self) -> i32 {
        self.0.rating.stars().into()
    }

    /// ID of the `User` who left this `Review`.
    #[must_use]
    pub fn author_id(&self) -> api::user::Id {
        self.0.author.into()
    }

    /// `User` who left this `Review`, if registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Review.author",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn author(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::User>, Error> {
        ctx.service()
            .execute(query::user::ById::by(self.0.author))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|u| u.map(Into::into))
    }

    /// `DateTime` when this `Review` was left.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Review`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::review::Id)]
#[into(domain::review::Id)]
#[graphql(name = "ReviewId", transparent)]
pub struct Id(Uuid);

/// Comment of a `Review`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReviewComment",
    with = scalar::Via::<domain::review::Comment>,
)]
pub struct Comment(domain::review::Comment);
