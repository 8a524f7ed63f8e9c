//! [`Command`] for creating a new [`Listing`].

use std::convert::Infallible;

use common::{
    operations::{By, Insert, Resolve},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, Geometry, Place},
        user, Listing,
    },
    infra::{database, Database, Geocoder},
    query::listing::ResolveGeometry,
    Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for creating a new [`Listing`].
///
/// [`Geometry`] of the new [`Listing`] is resolved on the best-effort basis.
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// ID of the [`User`] owning the new [`Listing`].
    pub owner: user::Id,

    /// [`listing::Title`] of the new [`Listing`].
    pub title: listing::Title,

    /// [`listing::Description`] of the new [`Listing`].
    pub description: Option<listing::Description>,

    /// [`listing::Image`] of the new [`Listing`].
    pub image: Option<listing::Image>,

    /// [`listing::Price`] of the new [`Listing`].
    pub price: Option<listing::Price>,

    /// [`listing::Location`] of the new [`Listing`].
    pub location: Option<listing::Location>,

    /// [`listing::Country`] of the new [`Listing`].
    pub country: Option<listing::Country>,

    /// [`listing::Category`] of the new [`Listing`].
    pub category: listing::Category,
}

impl<Db, Geo> Command<CreateListing> for Service<Db, Geo>
where
    Db: Database<Insert<Listing>, Ok = (), Err = Traced<database::Error>>,
    Geo: Geocoder<
        Resolve<By<Option<Geometry>, Place>>,
        Ok = Option<Geometry>,
        Err = Infallible,
    >,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing,
    ) -> Result<Self::Ok, Self::Err> {
        let CreateListing {
            owner,
            title,
            description,
            image,
            price,
            location,
            country,
            category,
        } = cmd;

        let mut listing = Listing {
            id: listing::Id::new(),
            title,
            description,
            image,
            price,
            location,
            country,
            category,
            geometry: None,
            owner,
            reviews: vec![],
            created_at: DateTime::now().coerce(),
        };
        let geometry = self
            .execute(ResolveGeometry(&listing))
            .await
            .unwrap_or_else(|e| match e {});
        listing.geometry = geometry;

        self.database()
            .execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use super::CreateListing;
    use crate::{
        domain::{listing, user, Listing},
        infra::Memory,
        testing::{self, CountingGeocoder},
        Command as _,
    };

    fn create(location: Option<&str>) -> CreateListing {
        CreateListing {
            owner: user::Id::new(),
            title: listing::Title::new("Beach hut").unwrap(),
            description: None,
            image: None,
            price: None,
            location: location.and_then(listing::Location::new),
            country: listing::Country::new("India"),
            category: listing::Category::Beach,
        }
    }

    #[tokio::test]
    async fn stores_resolved_geometry() {
        let db = Memory::new();
        let geo = CountingGeocoder::found();
        let svc = testing::service(db.clone(), geo.clone());

        let created = svc.execute(create(Some("Goa"))).await.unwrap();

        let stored = db
            .execute(Select(By::<Option<Listing>, _>::new(created.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.geometry, Some(testing::geometry()));
        assert_eq!(geo.queries(), ["Goa, India"]);
    }

    #[tokio::test]
    async fn stores_without_geometry_when_not_found() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::missing());

        let created = svc.execute(create(None)).await.unwrap();

        let stored = db
            .execute(Select(By::<Option<Listing>, _>::new(created.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.geometry, None);
        assert_eq!(stored.title, created.title);
    }
}
