//! [`Command`] for updating a [`Listing`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{listing::Geometry, User};
use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Listing`] by its owner.
///
/// Changing a [`listing::Location`] or a [`listing::Country`] drops the
/// [`Geometry`] of the [`Listing`], so it's resolved again later.
#[derive(Clone, Debug)]
pub struct UpdateListing {
    /// ID of the [`Listing`] to update.
    pub listing_id: listing::Id,

    /// ID of the [`User`] performing the update.
    pub by: user::Id,

    /// New [`listing::Title`] of the [`Listing`].
    pub title: listing::Title,

    /// New [`listing::Description`] of the [`Listing`].
    pub description: Option<listing::Description>,

    /// New [`listing::Image`] of the [`Listing`].
    ///
    /// The current one is kept if [`None`].
    pub image: Option<listing::Image>,

    /// New [`listing::Price`] of the [`Listing`].
    pub price: Option<listing::Price>,

    /// New [`listing::Location`] of the [`Listing`].
    pub location: Option<listing::Location>,

    /// New [`listing::Country`] of the [`Listing`].
    pub country: Option<listing::Country>,

    /// New [`listing::Category`] of the [`Listing`].
    pub category: listing::Category,
}

impl<Db, Geo> Command<UpdateListing> for Service<Db, Geo>
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
        > + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListing {
            listing_id,
            by,
            title,
            description,
            image,
            price,
            location,
            country,
            category,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent updates of the same `Listing`.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;
        if listing.owner != by {
            return Err(tracerr::new!(E::NotOwner(by)));
        }

        if listing.location != location || listing.country != country {
            listing.geometry = None;
        }
        listing.title = title;
        listing.description = description;
        if let Some(image) = image {
            listing.image = Some(image);
        }
        listing.price = price;
        listing.location = location;
        listing.country = country;
        listing.category = category;

        tx.execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(listing)
    }
}

/// Error of [`UpdateListing`] [`Command`] execution.
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

    use super::{ExecutionError, UpdateListing};
    use crate::{
        domain::{listing, user, Listing},
        infra::Memory,
        testing::{self, CountingGeocoder},
        Command as _,
    };

    fn update(listing: &Listing, location: &str) -> UpdateListing {
        UpdateListing {
            listing_id: listing.id,
            by: listing.owner,
            title: listing::Title::new("Renamed").unwrap(),
            description: None,
            image: None,
            price: listing::Price::new(99.into()),
            location: listing::Location::new(location),
            country: listing.country.clone(),
            category: listing.category,
        }
    }

    async fn seeded() -> (Memory, Listing) {
        let db = Memory::new();
        let mut listing = testing::listing("Villa");
        listing.geometry = Some(testing::geometry());
        db.execute(Insert(listing.clone())).await.unwrap();
        (db, listing)
    }

    #[tokio::test]
    async fn keeps_geometry_for_same_place() {
        let (db, listing) = seeded().await;
        let svc = testing::service(db.clone(), CountingGeocoder::missing());

        let updated = svc.execute(update(&listing, "Goa")).await.unwrap();

        assert_eq!(updated.title.to_string(), "Renamed");
        assert_eq!(updated.geometry, Some(testing::geometry()));
    }

    #[tokio::test]
    async fn drops_geometry_for_moved_place() {
        let (db, listing) = seeded().await;
        let svc = testing::service(db.clone(), CountingGeocoder::missing());

        drop(svc.execute(update(&listing, "Mumbai")).await.unwrap());

        let stored = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.geometry, None);
        assert_eq!(stored.location, listing::Location::new("Mumbai"));
    }

    #[tokio::test]
    async fn allows_owner_only() {
        let (db, listing) = seeded().await;
        let svc = testing::service(db, CountingGeocoder::missing());
        let stranger = user::Id::new();

        let err = svc
            .execute(UpdateListing {
                by: stranger,
                ..update(&listing, "Goa")
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotOwner(id) if *id == stranger,
        ));

        let err = svc
            .execute(UpdateListing {
                listing_id: listing::Id::new(),
                ..update(&listing, "Goa")
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::ListingNotExists(_)));
    }
}
