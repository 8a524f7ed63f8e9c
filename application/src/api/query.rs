//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{command, domain, query, read::listing::list, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns all the existing `ListingCategory` values, in their display
    /// order.
    #[must_use]
    pub fn categories() -> Vec<api::listing::Category> {
        domain::listing::Category::ALL
            .iter()
            .copied()
            .map(Into::into)
            .collect()
    }

    /// Fetches a page of the `Listing` catalog.
    ///
    /// Never fails on malformed arguments:
    /// - unknown `category` or `sort` is ignored;
    /// - blank `q` is ignored, otherwise it's searched case-insensitively in
    ///   the `title`, `location` and `country`;
    /// - non-numeric `minPrice` or `maxPrice` is ignored;
    /// - non-positive or non-numeric `page` means the first page, while a
    ///   page past the last one means the last page.
    #[tracing::instrument(
        skip_all,
        fields(
            category = ?category,
            gql.name = "listings",
            max_price = ?max_price,
            min_price = ?min_price,
            otel.name = Self::SPAN_NAME,
            page = ?page,
            q = ?q,
            sort = ?sort,
        ),
    )]
    pub async fn listings(
        category: Option<String>,
        q: Option<String>,
        min_price: Option<String>,
        max_price: Option<String>,
        sort: Option<String>,
        page: Option<String>,
        ctx: &Context,
    ) -> Result<api::listing::list::Page, Error> {
        let selector = list::Selector::build(&list::RawParams {
            category,
            q,
            min_price,
            max_price,
            sort,
            page,
        });

        ctx.service()
            .execute(query::listings::List(selector.clone()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|p| api::listing::list::Page::new(p, selector))
    }

    /// Returns the `Listing` with the specified ID.
    ///
    /// Resolves the missing `geometry` of the `Listing` on the way, if
    /// possible.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let listing = ctx
            .service()
            .execute(query::listing::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ListingError::NotExists.into())
            .map_err(ctx.error())?;

        let listing = ctx
            .service()
            .execute(command::EnsureListingGeometry { listing })
            .await
            .unwrap_or_else(|e| match e {});

        Ok(listing.into())
    }

    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `USER_NOT_EXISTS` - the authenticated `User` is not registered yet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
