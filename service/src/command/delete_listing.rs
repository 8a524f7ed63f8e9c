//! [`Command`] for deleting a [`Listing`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{listing, review, user, Listing, Review},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Listing`] along with all its [`Review`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeleteListing {
    /// ID of the [`Listing`] to delete.
    pub listing_id: listing::Id,

    /// ID of the [`User`] performing the deletion.
    pub by: user::Id,
}

impl<Db, Geo> Command<DeleteListing> for Service<Db, Geo>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vec<Review>, Vec<review::Id>>>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteListing { listing_id, by } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;
        if listing.owner != by {
            return Err(tracerr::new!(E::NotOwner(by)));
        }

        _ = tx
            .execute(Delete(By::<Vec<Review>, _>::new(listing.reviews.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(By::<Listing, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(listing)
    }
}

/// Error of [`DeleteListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] doesn't exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] doesn't own the [`Listing`].
    #[display("`User(id: {_0})` is not the owner")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use super::{DeleteListing, ExecutionError};
    use crate::{
        domain::{user, Listing, Review},
        infra::Memory,
        testing::{self, CountingGeocoder},
        Command as _,
    };

    #[tokio::test]
    async fn deletes_listing_with_its_reviews() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::missing());

        let mut listing = testing::listing("Villa");
        let mut other = testing::listing("Hut");
        let reviews = [testing::review(5), testing::review(3)];
        let kept = testing::review(4);
        for r in reviews.iter().chain([&kept]) {
            db.execute(Insert(r.clone())).await.unwrap();
        }
        listing.reviews = reviews.iter().map(|r| r.id).collect();
        other.reviews = vec![kept.id];
        db.execute(Insert(listing.clone())).await.unwrap();
        db.execute(Insert(other.clone())).await.unwrap();

        let deleted = svc
            .execute(DeleteListing {
                listing_id: listing.id,
                by: listing.owner,
            })
            .await
            .unwrap();
        assert_eq!(deleted.id, listing.id);

        let found = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap();
        assert!(found.is_none());
        for r in &reviews {
            let found = db
                .execute(Select(By::<Option<Review>, _>::new(r.id)))
                .await
                .unwrap();
            assert!(found.is_none());
        }
        let found = db
            .execute(Select(By::<Option<Review>, _>::new(kept.id)))
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn allows_owner_only() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::missing());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        let err = svc
            .execute(DeleteListing {
                listing_id: listing.id,
                by: user::Id::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotOwner(_)));

        let found = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap();
        assert!(found.is_some());
    }
}
