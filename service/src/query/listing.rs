//! [`Query`] collection related to a single [`Listing`].

use std::{collections::HashMap, convert::Infallible};

use common::operations::{By, Resolve, Select};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, Geometry, Place},
        review, Listing, Review,
    },
    infra::{database, Database, Geocoder},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`Listing`] by its [`listing::Id`].
pub type ById = DatabaseQuery<By<Option<Listing>, listing::Id>>;

/// [`Query`] resolving the missing [`Geometry`] of a [`Listing`].
///
/// Returns [`None`] without any lookup if the [`Listing`] has its [`Geometry`]
/// already, or there is no [`Place`] to look it up by. Never fails: lookup
/// failures resolve to [`None`] as well.
#[derive(Clone, Copy, Debug)]
pub struct ResolveGeometry<'l>(pub &'l Listing);

impl<Db, Geo> Query<ResolveGeometry<'_>> for Service<Db, Geo>
where
    Geo: Geocoder<
        Resolve<By<Option<Geometry>, Place>>,
        Ok = Option<Geometry>,
        Err = Infallible,
    >,
{
    type Ok = Option<Geometry>;
    type Err = Infallible;

    async fn execute(
        &self,
        ResolveGeometry(listing): ResolveGeometry<'_>,
    ) -> Result<Self::Ok, Self::Err> {
        if !listing.needs_geometry() {
            return Ok(None);
        }
        let Some(place) = listing.place() else {
            return Ok(None);
        };
        self.geocoder().execute(Resolve(By::new(place))).await
    }
}

/// [`Query`] of the [`Review`]s left on a [`Listing`], in the order they were
/// left.
#[derive(Clone, Copy, Debug)]
pub struct Reviews<'l>(pub &'l Listing);

impl<Db, Geo> Query<Reviews<'_>> for Service<Db, Geo>
where
    Db: Database<
        Select<By<HashMap<review::Id, Review>, Vec<review::Id>>>,
        Ok = HashMap<review::Id, Review>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Reviews(listing): Reviews<'_>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut reviews = self
            .database()
            .execute(Select(By::<HashMap<_, Review>, _>::new(
                listing.reviews.clone(),
            )))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(listing
            .reviews
            .iter()
            .filter_map(|id| reviews.remove(id))
            .collect())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use super::{ResolveGeometry, Reviews};
    use crate::{
        domain::{
            listing::{Country, Geometry},
            review,
        },
        infra::Memory,
        testing::{self, CountingGeocoder},
        Query as _,
    };

    #[tokio::test]
    async fn resolves_missing_geometry() {
        let geo = CountingGeocoder::found();
        let svc = testing::service(Memory::new(), geo.clone());
        let listing = testing::listing("Villa");

        let geometry = svc.execute(ResolveGeometry(&listing)).await.unwrap();

        assert_eq!(geometry, Some(testing::geometry()));
        assert_eq!(geo.queries(), ["Goa, India"]);
    }

    #[tokio::test]
    async fn skips_lookup_when_resolved_or_nowhere() {
        let geo = CountingGeocoder::found();
        let svc = testing::service(Memory::new(), geo.clone());

        let mut resolved = testing::listing("Resolved");
        resolved.geometry = Geometry::from_coordinates(&[1.0, 2.0]);
        let mut nowhere = testing::listing("Nowhere");
        nowhere.location = None;
        nowhere.country = None;

        assert_eq!(svc.execute(ResolveGeometry(&resolved)).await.unwrap(), None);
        assert_eq!(svc.execute(ResolveGeometry(&nowhere)).await.unwrap(), None);
        assert_eq!(geo.calls(), 0);

        nowhere.country = Country::new("Peru");
        let geometry = svc.execute(ResolveGeometry(&nowhere)).await.unwrap();
        assert_eq!(geometry, Some(testing::geometry()));
        assert_eq!(geo.queries(), ["Peru"]);
    }

    #[tokio::test]
    async fn lists_reviews_in_listing_order() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::missing());
        let first = testing::review(5);
        let second = testing::review(3);
        for r in [&second, &first] {
            db.execute(Insert(r.clone())).await.unwrap();
        }
        let mut listing = testing::listing("Villa");
        listing.reviews = vec![first.id, second.id, review::Id::new()];

        let reviews = svc.execute(Reviews(&listing)).await.unwrap();

        assert_eq!(
            reviews.iter().map(|r| r.id).collect::<Vec<_>>(),
            [first.id, second.id],
        );
    }
}
