//! [`Command`] for ensuring a [`Listing`] has its [`Geometry`].

use std::convert::Infallible;

use common::operations::{By, Resolve, Update};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        listing::{Geometry, Place, ResolvedGeometry},
        Listing,
    },
    infra::{database, Database, Geocoder},
    query::listing::ResolveGeometry,
    Service,
};

use super::Command;

/// [`Command`] for resolving the missing [`Geometry`] of a [`Listing`] and
/// saving it, so it's resolved at most once.
///
/// Only the [`Geometry`] is saved, and only if the stored [`Listing`] still
/// exists at the same place. Other changes made to the [`Listing`] during
/// the lookup are kept.
///
/// Never fails: a failure to save the resolved [`Geometry`] is logged, and
/// the [`Listing`] is returned with the resolved [`Geometry`] anyway.
#[derive(Clone, Debug)]
pub struct EnsureListingGeometry {
    /// [`Listing`] to ensure the [`Geometry`] of.
    pub listing: Listing,
}

impl<Db, Geo> Command<EnsureListingGeometry> for Service<Db, Geo>
where
    Db: Database<
        Update<ResolvedGeometry>,
        Ok = bool,
        Err = Traced<database::Error>,
    >,
    Geo: Geocoder<
        Resolve<By<Option<Geometry>, Place>>,
        Ok = Option<Geometry>,
        Err = Infallible,
    >,
{
    type Ok = Listing;
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: EnsureListingGeometry,
    ) -> Result<Self::Ok, Self::Err> {
        let EnsureListingGeometry { mut listing } = cmd;

        let Some(geometry) = self.execute(ResolveGeometry(&listing)).await?
        else {
            return Ok(listing);
        };
        listing.geometry = Some(geometry);

        match self
            .database()
            .execute(Update(ResolvedGeometry::of(&listing, geometry)))
            .await
        {
            Ok(true) => {}
            Ok(false) => log::debug!(
                "`Listing(id: {})` was moved or deleted during lookup, \
                 resolved `Geometry` is discarded",
                listing.id,
            ),
            Err(e) => log::warn!(
                "failed to save `Geometry` of `Listing(id: {})`: {e}",
                listing.id,
            ),
        }

        Ok(listing)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use super::EnsureListingGeometry;
    use crate::{
        command::{DeleteListing, UpdateListing},
        domain::{listing, Listing},
        infra::Memory,
        query,
        testing::{self, CountingGeocoder, Yielding},
        Command as _,
    };

    async fn stored(db: &Memory, listing: &Listing) -> Listing {
        try_stored(db, listing).await.unwrap()
    }

    async fn try_stored(db: &Memory, listing: &Listing) -> Option<Listing> {
        db.execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
    }

    fn rename(listing: &Listing, location: &str) -> UpdateListing {
        UpdateListing {
            listing_id: listing.id,
            by: listing.owner,
            title: listing::Title::new("Renamed").unwrap(),
            description: None,
            image: None,
            price: listing.price,
            location: listing::Location::new(location),
            country: listing.country.clone(),
            category: listing.category,
        }
    }

    #[tokio::test]
    async fn resolves_geometry_once() {
        let db = Memory::new();
        let geo = CountingGeocoder::found();
        let svc = testing::service(db.clone(), geo.clone());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        for _ in 0..3 {
            let loaded = svc
                .execute(query::listing::ById::by(listing.id))
                .await
                .unwrap()
                .unwrap();
            let ensured = svc
                .execute(EnsureListingGeometry { listing: loaded })
                .await
                .unwrap();
            assert_eq!(ensured.geometry, Some(testing::geometry()));
        }

        assert_eq!(geo.calls(), 1);
        assert_eq!(
            stored(&db, &listing).await.geometry,
            Some(testing::geometry()),
        );
    }

    #[tokio::test]
    async fn keeps_listing_unchanged_when_not_found() {
        let db = Memory::new();
        let geo = CountingGeocoder::missing();
        let svc = testing::service(db.clone(), geo.clone());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        let ensured = svc
            .execute(EnsureListingGeometry {
                listing: listing.clone(),
            })
            .await
            .unwrap();

        assert_eq!(ensured.geometry, None);
        assert_eq!(geo.calls(), 1);
        assert_eq!(stored(&db, &listing).await.geometry, None);
    }

    #[tokio::test]
    async fn returns_geometry_despite_save_failure() {
        let db = Memory::new();
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();
        let svc = testing::service(db.read_only(), CountingGeocoder::found());

        let ensured = svc
            .execute(EnsureListingGeometry {
                listing: listing.clone(),
            })
            .await
            .unwrap();

        assert_eq!(ensured.geometry, Some(testing::geometry()));
        assert_eq!(stored(&db, &listing).await.geometry, None);
    }

    #[tokio::test]
    async fn keeps_deleted_listing_deleted() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::found());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        _ = svc
            .execute(DeleteListing {
                listing_id: listing.id,
                by: listing.owner,
            })
            .await
            .unwrap();
        let ensured = svc
            .execute(EnsureListingGeometry {
                listing: listing.clone(),
            })
            .await
            .unwrap();

        assert_eq!(ensured.geometry, Some(testing::geometry()));
        assert!(try_stored(&db, &listing).await.is_none());
    }

    #[tokio::test]
    async fn keeps_concurrent_update_of_same_place() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::found());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        _ = svc.execute(rename(&listing, "Goa")).await.unwrap();
        _ = svc
            .execute(EnsureListingGeometry {
                listing: listing.clone(),
            })
            .await
            .unwrap();

        let stored = stored(&db, &listing).await;
        assert_eq!(stored.title.to_string(), "Renamed");
        assert_eq!(stored.geometry, Some(testing::geometry()));
    }

    #[tokio::test]
    async fn discards_geometry_of_moved_listing() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::found());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        _ = svc.execute(rename(&listing, "Rome")).await.unwrap();
        _ = svc
            .execute(EnsureListingGeometry {
                listing: listing.clone(),
            })
            .await
            .unwrap();

        let stored = stored(&db, &listing).await;
        assert_eq!(stored.title.to_string(), "Renamed");
        assert_eq!(
            stored.location.as_ref().map(ToString::to_string).as_deref(),
            Some("Rome"),
        );
        assert_eq!(stored.geometry, None);
    }

    /// Interleaved enrichments both look the place up and store the same
    /// `Geometry`.
    #[tokio::test]
    async fn concurrent_enrichments_converge() {
        let db = Memory::new();
        let geo = CountingGeocoder::found();
        let svc = testing::service(Yielding(db.clone()), geo.clone());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        let (a, b) = tokio::join!(
            svc.execute(EnsureListingGeometry {
                listing: listing.clone(),
            }),
            svc.execute(EnsureListingGeometry {
                listing: listing.clone(),
            }),
        );

        assert_eq!(a.unwrap().geometry, Some(testing::geometry()));
        assert_eq!(b.unwrap().geometry, Some(testing::geometry()));
        assert_eq!(geo.calls(), 2);
        let stored = stored(&db, &listing).await;
        assert_eq!(stored.geometry, Some(testing::geometry()));
        assert_eq!(stored.title, listing.title);
    }
}
