//! [`Query`] collection related to a single [`User`].

use std::collections::HashMap;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, User},
    infra::{database, Database},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`User`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// [`Query`] of the favorite [`Listing`]s of a [`User`] which still exist.
///
/// [`Listing`]s are returned in their creation order.
#[derive(Clone, Copy, Debug)]
pub struct Favorites(pub user::Id);

impl<Db, Geo> Query<Favorites> for Service<Db, Geo>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<listing::Id, Listing>, Vec<listing::Id>>>,
            Ok = HashMap<listing::Id, Listing>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Favorites(user_id): Favorites,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(user) = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(vec![]);
        };

        let ids = user.favorites.into_iter().collect::<Vec<_>>();
        let mut listings = self
            .database()
            .execute(Select(By::<HashMap<_, Listing>, _>::new(ids)))
            .await
            .map_err(tracerr::wrap!())?
            .into_values()
            .collect::<Vec<_>>();
        listings.sort_by_key(|l| l.id);

        Ok(listings)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert};

    use super::Favorites;
    use crate::{
        domain::{user, Listing},
        infra::Memory,
        testing::{self, CountingGeocoder},
        Query as _,
    };

    #[tokio::test]
    async fn lists_existing_favorites() {
        let db = Memory::new();
        let kept = testing::listing("Kept");
        let gone = testing::listing("Gone");
        let other = testing::listing("Other");
        for l in [&kept, &gone, &other] {
            db.execute(Insert(l.clone())).await.unwrap();
        }
        let mut user = testing::user();
        user.favorites = [kept.id, gone.id].into();
        db.execute(Insert(user.clone())).await.unwrap();
        db.execute(Delete(By::<Listing, _>::new(gone.id))).await.unwrap();
        let svc = testing::service(db, CountingGeocoder::missing());

        let favorites = svc.execute(Favorites(user.id)).await.unwrap();

        assert_eq!(
            favorites.iter().map(|l| l.id).collect::<Vec<_>>(),
            [kept.id],
        );
    }

    #[tokio::test]
    async fn unknown_user_has_no_favorites() {
        let svc = testing::service(Memory::new(), CountingGeocoder::missing());

        let favorites = svc
            .execute(Favorites(user::Id::new()))
            .await
            .unwrap();

        assert!(favorites.is_empty());
    }
}
