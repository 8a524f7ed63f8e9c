//! GraphQL [`Mutation`]s definitions.

use juniper::{graphql_object, GraphQLObject};
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers the currently authenticated `User` with the provided name.
    ///
    /// Returns the already registered `User` as is, if any.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "registerUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn register_user(
        name: api::user::Name,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateUser {
                user_id: my_id.into(),
                name: name.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Listing` owned by the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INCOMPLETE_IMAGE` - only one of `imageUrl` and `imageFilename` is
    ///                        provided.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %category,
            country = ?country,
            gql.name = "createListing",
            location = ?location,
            otel.name = Self::SPAN_NAME,
            price = ?price,
            title = %title,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn create_listing(
        title: api::listing::Title,
        description: Option<api::listing::Description>,
        image_url: Option<api::listing::ImageUrl>,
        image_filename: Option<api::listing::ImageFilename>,
        price: Option<api::listing::Price>,
        location: Option<api::listing::Location>,
        country: Option<api::listing::Country>,
        category: api::listing::Category,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let image = image(image_url, image_filename).map_err(ctx.error())?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateListing {
                owner: my_id.into(),
                title: title.into(),
                description: description.map(Into::into),
                image,
                price: price.map(Into::into),
                location: location.map(Into::into),
                country: country.map(Into::into),
                category: category.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `Listing` owned by the currently authenticated `User`.
    ///
    /// The current image is kept unless a new one is provided. Changing the
    /// `location` or the `country` resets the `geometry`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INCOMPLETE_IMAGE` - only one of `imageUrl` and `imageFilename` is
    ///                        provided;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `NOT_OWNER` - the current `User` doesn't own the `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %category,
            country = ?country,
            gql.name = "updateListing",
            id = %id,
            location = ?location,
            otel.name = Self::SPAN_NAME,
            price = ?price,
            title = %title,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn update_listing(
        id: api::listing::Id,
        title: api::listing::Title,
        description: Option<api::listing::Description>,
        image_url: Option<api::listing::ImageUrl>,
        image_filename: Option<api::listing::ImageFilename>,
        price: Option<api::listing::Price>,
        location: Option<api::listing::Location>,
        country: Option<api::listing::Country>,
        category: api::listing::Category,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let image = image(image_url, image_filename).map_err(ctx.error())?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateListing {
                listing_id: id.into(),
                by: my_id.into(),
                title: title.into(),
                description: description.map(Into::into),
                image,
                price: price.map(Into::into),
                location: location.map(Into::into),
                country: country.map(Into::into),
                category: category.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Listing` owned by the currently authenticated `User`,
    /// along with all its `Review`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `NOT_OWNER` - the current `User` doesn't own the `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteListing {
                listing_id: id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Leaves a new `Review` on the `Listing` on behalf of the currently
    /// authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_RATING` - `rating` is not from `1` to `5`;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createReview",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
            rating = %rating,
        ),
    )]
    pub async fn create_review(
        listing_id: api::listing::Id,
        comment: api::review::Comment,
        rating: i32,
        ctx: &Context,
    ) -> Result<api::Review, Error> {
        let rating = i16::try_from(rating)
            .ok()
            .and_then(domain::review::Rating::new)
            .ok_or_else(|| ReviewInputError::InvalidRating.into())
            .map_err(ctx.error())?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateReview {
                listing_id: listing_id.into(),
                author: my_id.into(),
                comment: comment.into(),
                rating,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Review` left by the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `REVIEW_NOT_EXISTS` - the `Review` with the specified ID does not
    ///                         exist on the `Listing`;
    /// - `NOT_AUTHOR` - the current `User` didn't leave the `Review`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteReview",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
            review_id = %review_id,
        ),
    )]
    pub async fn delete_review(
        listing_id: api::listing::Id,
        review_id: api::review::Id,
        ctx: &Context,
    ) -> Result<api::Review, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteReview {
                listing_id: listing_id.into(),
                review_id: review_id.into(),
                by: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Adds the `Listing` to the favorites of the currently authenticated
    /// `User`, or removes it from there if it's already present.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `USER_NOT_EXISTS` - the current `User` is not registered yet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "toggleFavorite",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn toggle_favorite(
        listing_id: api::listing::Id,
        ctx: &Context,
    ) -> Result<ToggleFavoriteResult, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let command::toggle_favorite::Toggled { added, user } = ctx
            .service()
            .execute(command::ToggleFavorite {
                user_id: my_id.into(),
                listing_id: listing_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(ToggleFavoriteResult {
            added,
            user: user.into(),
        })
    }
}

/// Result of a favorite `Listing` toggling.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct ToggleFavoriteResult {
    /// Indicator whether the `Listing` was added to the favorites, rather
    /// than removed.
    pub added: bool,

    /// `User` with the toggled favorites.
    pub user: api::User,
}

/// Combines the provided parts of a [`domain::listing::Image`].
///
/// # Errors
///
/// If only one of the parts is provided.
fn image(
    url: Option<api::listing::ImageUrl>,
    filename: Option<api::listing::ImageFilename>,
) -> Result<Option<domain::listing::Image>, Error> {
    match (url, filename) {
        (Some(url), Some(filename)) => Ok(Some(domain::listing::Image {
            url: url.into(),
            filename: filename.into(),
        })),
        (None, None) => Ok(None),
        (Some(_), None) | (None, Some(_)) => {
            Err(ListingInputError::IncompleteImage.into())
        }
    }
}

define_error! {
    enum ListingInputError {
        #[code = "INCOMPLETE_IMAGE"]
        #[status = BAD_REQUEST]
        #[message = "Both `imageUrl` and `imageFilename` must be provided"]
        IncompleteImage,
    }
}

define_error! {
    enum ReviewInputError {
        #[code = "INVALID_RATING"]
        #[status = BAD_REQUEST]
        #[message = "`rating` must be from 1 to 5"]
        InvalidRating,
    }
}

define_error! {
    enum OwnershipError {
        #[code = "NOT_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must own the `Listing`"]
        NotOwner,

        #[code = "NOT_AUTHOR"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be the author of the `Review`"]
        NotAuthor,
    }
}

impl AsError for command::update_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => {
                api::query::ListingError::NotExists.into()
            }
            Self::NotOwner(_) => OwnershipError::NotOwner.into(),
        })
    }
}

impl AsError for command::delete_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => {
                api::query::ListingError::NotExists.into()
            }
            Self::NotOwner(_) => OwnershipError::NotOwner.into(),
        })
    }
}

impl AsError for command::create_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotExists(_) => {
                Some(api::query::ListingError::NotExists.into())
            }
        }
    }
}

impl AsError for command::delete_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "REVIEW_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Review` with the provided ID does not exist on \
                             the `Listing`"]
                ReviewNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => {
                api::query::ListingError::NotExists.into()
            }
            Self::ReviewNotExists(_) => Error::ReviewNotExists.into(),
            Self::NotAuthor(_) => OwnershipError::NotAuthor.into(),
        })
    }
}

impl AsError for command::toggle_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}
