//! [`Command`] for leaving a [`Review`] on a [`Listing`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
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

/// [`Command`] for leaving a new [`Review`] on a [`Listing`].
#[derive(Clone, Debug)]
pub struct CreateReview {
    /// ID of the reviewed [`Listing`].
    pub listing_id: listing::Id,

    /// ID of the [`User`] leaving the [`Review`].
    pub author: user::Id,

    /// [`review::Comment`] of the new [`Review`].
    pub comment: review::Comment,

    /// [`review::Rating`] of the new [`Review`].
    pub rating: review::Rating,
}

impl<Db, Geo> Command<CreateReview> for Service<Db, Geo>
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
        > + Database<Insert<Review>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Review;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReview {
            listing_id,
            author,
            comment,
            rating,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid losing concurrently added `Review`s.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        let review = Review {
            id: review::Id::new(),
            comment,
            rating,
            author,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(review.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        listing.reviews.push(review.id);
        tx.execute(Update(listing))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(review)
    }
}

/// Error of [`CreateReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] doesn't exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use super::{CreateReview, ExecutionError};
    use crate::{
        domain::{listing, review, user, Listing},
        infra::Memory,
        testing::{self, CountingGeocoder},
        Command as _,
    };

    fn review_of(listing_id: listing::Id, stars: i16) -> CreateReview {
        CreateReview {
            listing_id,
            author: user::Id::new(),
            comment: review::Comment::new("Lovely view").unwrap(),
            rating: review::Rating::new(stars).unwrap(),
        }
    }

    #[tokio::test]
    async fn appends_review_to_listing() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::missing());
        let listing = testing::listing("Villa");
        db.execute(Insert(listing.clone())).await.unwrap();

        let first = svc.execute(review_of(listing.id, 5)).await.unwrap();
        let second = svc.execute(review_of(listing.id, 2)).await.unwrap();

        let stored = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.reviews, [first.id, second.id]);
        assert_eq!(second.rating.stars(), 2);
    }

    #[tokio::test]
    async fn errors_on_missing_listing() {
        let svc = testing::service(Memory::new(), CountingGeocoder::missing());

        let err = svc
            .execute(review_of(listing::Id::new(), 4))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ListingNotExists(_)));
    }
}
