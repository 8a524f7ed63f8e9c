//! [`Listing`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A place offered in the catalog.
#[derive(Clone, Debug, From, Into)]
pub struct Listing(domain::Listing);

/// A place offered in the catalog.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Title of this `Listing`.
    #[must_use]
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Description of this `Listing`.
    #[must_use]
    pub fn description(&self) -> Option<Description> {
        self.0.description.clone().map(Into::into)
    }

    /// Uploaded image of this `Listing`.
    #[must_use]
    pub fn image(&self) -> Option<Image> {
        self.0.image.clone().map(Image)
    }

    /// URL of the image to show for this `Listing`.
    ///
    /// Points to a placeholder image if no image was uploaded.
    #[must_use]
    pub fn image_url(&self) -> String {
        self.0.image.as_ref().map_or_else(
            || domain::listing::Image::PLACEHOLDER.to_owned(),
            |i| i.url.to_string(),
        )
    }

    /// Price of this `Listing` per night.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.0.price.map(Into::into)
    }

    /// Location of this `Listing`.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.0.location.clone().map(Into::into)
    }

    /// Country of this `Listing`.
    #[must_use]
    pub fn country(&self) -> Option<Country> {
        self.0.country.clone().map(Into::into)
    }

    /// Category of this `Listing`.
    #[must_use]
    pub fn category(&self) -> Category {
        self.0.category.into()
    }

    /// Geographic shape of this `Listing`.
    ///
    /// Absent until resolved from the `location` and `country`.
    #[must_use]
    pub fn geometry(&self) -> Option<Geometry> {
        self.0.geometry.map(Geometry)
    }

    /// ID of the `User` owning this `Listing`.
    #[must_use]
    pub fn owner_id(&self) -> api::user::Id {
        self.0.owner.into()
    }

    /// `User` owning this `Listing`, if registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owner(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::User>, Error> {
        ctx.service()
            .execute(query::user::ById::by(self.0.owner))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|u| u.map(Into::into))
    }

    /// `Review`s left on this `Listing`, in the order they were left.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.reviews",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn reviews(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Review>, Error> {
        ctx.service()
            .execute(query::listing::Reviews(&self.0))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `Listing` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Uploaded image of a [`Listing`].
#[derive(Clone, Debug)]
pub struct Image(domain::listing::Image);

/// Uploaded image of a `Listing`.
#[graphql_object(name = "ListingImage", context = Context)]
impl Image {
    /// URL the image is served from.
    #[must_use]
    pub fn url(&self) -> ImageUrl {
        self.0.url.clone().into()
    }

    /// Name the image is kept under in the upload storage.
    #[must_use]
    pub fn filename(&self) -> ImageFilename {
        self.0.filename.clone().into()
    }

    /// URL of a downscaled version of the image.
    #[must_use]
    pub fn thumbnail_url(&self) -> String {
        self.0.thumbnail_url()
    }
}

/// Geographic shape of a [`Listing`].
#[derive(Clone, Copy, Debug)]
pub struct Geometry(domain::listing::Geometry);

/// Geographic shape of a `Listing`, in GeoJSON terms.
#[graphql_object(name = "ListingGeometry", context = Context)]
impl Geometry {
    /// Type of this `ListingGeometry`.
    ///
    /// Always `Point` at the moment.
    #[graphql(name = "type")]
    #[must_use]
    pub fn kind(&self) -> String {
        self.0.type_name().to_owned()
    }

    /// Coordinates of this `ListingGeometry` in `[longitude, latitude]`
    /// order.
    #[must_use]
    pub fn coordinates(&self) -> Vec<f64> {
        self.0.coordinates().to_array().to_vec()
    }
}

/// Unique identifier of a `Listing`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Title of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingTitle",
    with = scalar::Via::<domain::listing::Title>,
)]
pub struct Title(domain::listing::Title);

/// Description of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingDescription",
    with = scalar::Via::<domain::listing::Description>,
)]
pub struct Description(domain::listing::Description);

/// Price of a `Listing`, as a non-negative decimal string.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingPrice",
    with = scalar::Via::<domain::listing::Price>,
)]
pub struct Price(domain::listing::Price);

/// Location of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingLocation",
    with = scalar::Via::<domain::listing::Location>,
)]
pub struct Location(domain::listing::Location);

/// Country of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingCountry",
    with = scalar::Via::<domain::listing::Country>,
)]
pub struct Country(domain::listing::Country);

/// URL of a `Listing` image.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingImageUrl",
    with = scalar::Via::<domain::listing::ImageUrl>,
)]
pub struct ImageUrl(domain::listing::ImageUrl);

/// Name of a `Listing` image in the upload storage.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingImageFilename",
    with = scalar::Via::<domain::listing::ImageFilename>,
)]
pub struct ImageFilename(domain::listing::ImageFilename);

/// Category of a `Listing`, exactly as listed by the `categories` query.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingCategory",
    with = scalar::Via::<domain::listing::Category>,
)]
pub struct Category(domain::listing::Category);

/// Order of `Listing`s in the catalog.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingSort")]
pub enum Sort {
    /// Cheapest first.
    PriceAsc,

    /// Most expensive first.
    PriceDesc,

    /// Most recently created first.
    Newest,
}

impl From<service::read::listing::list::Sort> for Sort {
    fn from(sort: service::read::listing::list::Sort) -> Self {
        use service::read::listing::list::Sort as S;
        match sort {
            S::PriceAsc => Self::PriceAsc,
            S::PriceDesc => Self::PriceDesc,
            S::Newest => Self::Newest,
        }
    }
}

pub mod list {
    //! Definitions related to the [`Listing`] catalog.

    use juniper::graphql_object;
    use service::{query, read::listing::list, Query as _};

    use super::{Category, Id, Listing, Sort};
    use crate::{api, AsError, Context, Error};

    /// Converts the provided number into a GraphQL `Int`, saturating.
    fn saturating_int(n: impl TryInto<i32>) -> i32 {
        n.try_into().unwrap_or(i32::MAX)
    }

    /// Page of the [`Listing`] catalog.
    #[derive(Clone, Debug)]
    pub struct Page {
        /// Underlying [`list::Page`].
        page: list::Page,

        /// [`list::Selector`] the page was selected with.
        selector: list::Selector,
    }

    impl Page {
        /// Creates a new [`Page`] out of the provided [`list::Page`] and the
        /// [`list::Selector`] it was selected with.
        #[must_use]
        pub fn new(page: list::Page, selector: list::Selector) -> Self {
            Self { page, selector }
        }
    }

    /// Page of the `Listing` catalog.
    #[graphql_object(name = "ListingPage", context = Context)]
    impl Page {
        /// `Listing`s on this `ListingPage`.
        #[must_use]
        pub fn items(&self) -> Vec<Listing> {
            self.page.items.iter().cloned().map(Into::into).collect()
        }

        /// Total number of `Listing`s matching the `filters`.
        #[must_use]
        pub fn total_count(&self) -> i32 {
            saturating_int(self.page.pagination.total_count)
        }

        /// Total number of pages, at least `1`.
        #[must_use]
        pub fn total_pages(&self) -> i32 {
            saturating_int(self.page.pagination.total_pages)
        }

        /// Number of this `ListingPage`, starting from `1`.
        ///
        /// Never exceeds `totalPages`, even if a further page was requested.
        #[must_use]
        pub fn current_page(&self) -> i32 {
            saturating_int(self.page.pagination.page.get())
        }

        /// Maximum number of `Listing`s on a `ListingPage`.
        #[must_use]
        pub fn page_size(&self) -> i32 {
            saturating_int(self.page.pagination.page_size.get())
        }

        /// All the existing `ListingCategory` values.
        #[must_use]
        pub fn categories(&self) -> Vec<Category> {
            api::Query::categories()
        }

        /// Filters applied to this `ListingPage`.
        ///
        /// Invalid requested filters are omitted.
        #[must_use]
        pub fn filters(&self) -> Filters {
            Filters(self.selector.clone())
        }

        /// IDs of the favorite `Listing`s of the current `User`.
        ///
        /// Empty if not authenticated.
        #[tracing::instrument(
            skip_all,
            fields(
                gql.name = "ListingPage.favoriteIds",
                otel.name = api::Query::SPAN_NAME,
            ),
        )]
        pub async fn favorite_ids(
            &self,
            ctx: &Context,
        ) -> Result<Vec<Id>, Error> {
            let Some(session) = ctx.try_current_session().await? else {
                return Ok(vec![]);
            };
            let user = ctx
                .service()
                .execute(query::user::ById::by(session.user_id.into()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())?;

            let mut ids = user
                .map(|u| u.favorites.into_iter().collect::<Vec<_>>())
                .unwrap_or_default();
            ids.sort_unstable();
            Ok(ids.into_iter().map(Into::into).collect())
        }
    }

    /// Filters applied to a [`Page`].
    #[derive(Clone, Debug)]
    pub struct Filters(list::Selector);

    /// Filters applied to a `ListingPage`.
    #[graphql_object(name = "ListingFilters", context = Context)]
    impl Filters {
        /// Applied `ListingCategory`.
        #[must_use]
        pub fn category(&self) -> Option<Category> {
            self.0.filter.category.map(Into::into)
        }

        /// Applied search text.
        #[must_use]
        pub fn q(&self) -> Option<String> {
            self.0.filter.search.as_ref().map(ToString::to_string)
        }

        /// Applied lower bound of the `ListingPrice`.
        #[must_use]
        pub fn min_price(&self) -> Option<String> {
            self.0.filter.min_price.map(|p| p.to_string())
        }

        /// Applied upper bound of the `ListingPrice`.
        #[must_use]
        pub fn max_price(&self) -> Option<String> {
            self.0.filter.max_price.map(|p| p.to_string())
        }

        /// Applied `ListingSort`.
        #[must_use]
        pub fn sort(&self) -> Option<Sort> {
            self.0.sort.map(Into::into)
        }
    }
}
