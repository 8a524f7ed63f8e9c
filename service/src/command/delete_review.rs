//! [`Command`] for deleting a [`Review`] of a [`Listing`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted, Update,
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

/// [`Command`] for deleting a [`Review`] by its author.
#[derive(Clone, Copy, Debug)]
pub struct DeleteReview {
    /// ID of the [`Listing`] the [`Review`] belongs to.
    pub listing_id: listing::Id,

    /// ID of the [`Review`] to delete.
    pub review_id: review::Id,

    /// ID of the [`User`] performing the deletion.
    pub by: user::Id,
}

impl<Db, Geo> Command<DeleteReview> for Service<Db, Geo>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Review>, review::Id>>,
            Ok = Option<Review>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Delete<By<Review, review::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Review;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteReview {
            listing_id,
            review_id,
            by,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;
        let review = if listing.reviews.contains(&review_id) {
            tx.execute(Select(By::<Option<Review>, _>::new(review_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        } else {
            None
        }
        .ok_or(E::ReviewNotExists(review_id))
        .map_err(tracerr::wrap!())?;
        if review.author != by {
            return Err(tracerr::new!(E::NotAuthor(by)));
        }

        listing.reviews.retain(|id| *id != review_id);
        tx.execute(Update(listing))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(By::<Review, _>::new(review_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(review)
    }
}

/// Error of [`DeleteReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] doesn't exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Review`] doesn't exist on the [`Listing`].
    #[display("`Review(id: {_0})` does not exist")]
    #[from(ignore)]
    ReviewNotExists(#[error(not(source))] review::Id),

    /// [`User`] isn't the author of the [`Review`].
    #[display("`User(id: {_0})` is not the author")]
    #[from(ignore)]
    NotAuthor(#[error(not(source))] user::Id),
}
