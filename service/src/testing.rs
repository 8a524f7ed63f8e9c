//! Fixtures shared by unit tests.

use std::{
    collections::HashSet,
    convert::Infallible,
    sync::{Arc, Mutex},
};

use common::{
    operations::{By, Resolve},
    DateTime,
};

use crate::{
    domain::{
        listing::{self, Geometry, Place},
        review, user, Listing, Review, User,
    },
    infra::{Database, Geocoder, Memory},
    Config, Service,
};

/// Secret the test [`Session`] tokens are signed with.
///
/// [`Session`]: crate::domain::user::Session
pub(crate) const JWT_SECRET: &[u8] = b"test-secret";

/// Creates a new [`Service`] over the provided infrastructure.
pub(crate) fn service<Db, Geo>(database: Db, geocoder: Geo) -> Service<Db, Geo> {
    Service::new(
        Config {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                JWT_SECRET,
            ),
        },
        database,
        geocoder,
    )
}

/// [`Geometry`] resolved by [`CountingGeocoder::found()`].
pub(crate) fn geometry() -> Geometry {
    Geometry::from_coordinates(&[74.12, 15.29]).unwrap()
}

/// Creates a new [`Listing`] located in Goa, without [`Geometry`].
pub(crate) fn listing(title: &str) -> Listing {
    Listing {
        id: listing::Id::new(),
        title: listing::Title::new(title).unwrap(),
        description: None,
        image: None,
        price: None,
        location: listing::Location::new("Goa"),
        country: listing::Country::new("India"),
        category: listing::Category::Trending,
        geometry: None,
        owner: user::Id::new(),
        reviews: vec![],
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a new [`User`] without favorites.
pub(crate) fn user() -> User {
    User {
        id: user::Id::new(),
        name: user::Name::new("Alice").unwrap(),
        favorites: HashSet::new(),
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a new [`Review`] with the provided number of `stars`.
pub(crate) fn review(stars: i16) -> Review {
    Review {
        id: review::Id::new(),
        comment: review::Comment::new("Nice stay").unwrap(),
        rating: review::Rating::new(stars).unwrap(),
        author: user::Id::new(),
        created_at: DateTime::now().coerce(),
    }
}

/// [`Geocoder`] resolving every [`Place`] to the same result and recording
/// the looked up [`Place`]s.
#[derive(Clone, Debug)]
pub(crate) struct CountingGeocoder {
    /// Result of every lookup.
    result: Option<Geometry>,

    /// Looked up [`Place`]s, in the lookup order.
    queries: Arc<Mutex<Vec<String>>>,
}

impl CountingGeocoder {
    /// Creates a new [`CountingGeocoder`] resolving to [`geometry()`].
    pub(crate) fn found() -> Self {
        Self {
            result: Some(geometry()),
            queries: Arc::default(),
        }
    }

    /// Creates a new [`CountingGeocoder`] resolving nothing.
    pub(crate) fn missing() -> Self {
        Self {
            result: None,
            queries: Arc::default(),
        }
    }

    /// Returns the number of lookups performed.
    pub(crate) fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Returns the looked up [`Place`]s.
    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Geocoder<Resolve<By<Option<Geometry>, Place>>> for CountingGeocoder {
    type Ok = Option<Geometry>;
    type Err = Infallible;

    async fn execute(
        &self,
        Resolve(by): Resolve<By<Option<Geometry>, Place>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.queries.lock().unwrap().push(by.into_inner().to_string());
        Ok(self.result)
    }
}

/// [`Memory`] yielding to the runtime before every operation, so concurrent
/// [`Command`]s interleave their steps.
///
/// [`Command`]: crate::Command
#[derive(Clone, Debug)]
pub(crate) struct Yielding(pub(crate) Memory);

impl<Op> Database<Op> for Yielding
where
    Memory: Database<Op>,
{
    type Ok = <Memory as Database<Op>>::Ok;
    type Err = <Memory as Database<Op>>::Err;

    async fn execute(&self, op: Op) -> Result<Self::Ok, Self::Err> {
        tokio::task::yield_now().await;
        self.0.execute(op).await
    }
}
