//! [`Command`] for toggling a favorite [`Listing`] of a [`User`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Listing;
use crate::{
    domain::{listing, user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a [`Listing`] to the favorites of a [`User`], or
/// removing it from there if it's already present.
///
/// Not atomic: concurrent toggles of the same [`User`] may overwrite each
/// other.
#[derive(Clone, Copy, Debug)]
pub struct ToggleFavorite {
    /// ID of the [`User`] to toggle the favorite of.
    pub user_id: user::Id,

    /// ID of the toggled [`Listing`].
    pub listing_id: listing::Id,
}

/// Output of [`ToggleFavorite`] [`Command`].
#[derive(Clone, Debug)]
pub struct Toggled {
    /// Indicator whether the [`Listing`] was added to the favorites.
    pub added: bool,

    /// [`User`] with the toggled favorites.
    pub user: User,
}

impl<Db, Geo> Command<ToggleFavorite> for Service<Db, Geo>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Toggled;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleFavorite {
            user_id,
            listing_id,
        } = cmd;

        let mut user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let added = user.toggle_favorite(listing_id);
        self.database()
            .execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Toggled { added, user })
    }
}

/// Error of [`ToggleFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use super::{ExecutionError, ToggleFavorite};
    use crate::{
        domain::{listing, user, User},
        infra::Memory,
        testing::{self, CountingGeocoder, Yielding},
        Command as _,
    };

    async fn stored(db: &Memory, id: user::Id) -> User {
        db.execute(Select(By::<Option<User>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn toggles_back_and_forth() {
        let db = Memory::new();
        let svc = testing::service(db.clone(), CountingGeocoder::missing());
        let mut user = testing::user();
        let kept = listing::Id::new();
        _ = user.favorites.insert(kept);
        db.execute(Insert(user.clone())).await.unwrap();
        let listing_id = listing::Id::new();

        let on = svc
            .execute(ToggleFavorite {
                user_id: user.id,
                listing_id,
            })
            .await
            .unwrap();
        assert!(on.added);
        assert!(stored(&db, user.id).await.favorites.contains(&listing_id));

        let off = svc
            .execute(ToggleFavorite {
                user_id: user.id,
                listing_id,
            })
            .await
            .unwrap();
        assert!(!off.added);
        assert_eq!(stored(&db, user.id).await.favorites, user.favorites);
    }

    #[tokio::test]
    async fn errors_on_missing_user() {
        let svc = testing::service(Memory::new(), CountingGeocoder::missing());

        let err = svc
            .execute(ToggleFavorite {
                user_id: user::Id::new(),
                listing_id: listing::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }

    /// Interleaved toggles of the same `User` lose one of the updates.
    #[tokio::test]
    async fn concurrent_toggles_race() {
        let db = Memory::new();
        let svc =
            testing::service(Yielding(db.clone()), CountingGeocoder::missing());
        let user = testing::user();
        db.execute(Insert(user.clone())).await.unwrap();
        let (first, second) = (listing::Id::new(), listing::Id::new());

        let (a, b) = tokio::join!(
            svc.execute(ToggleFavorite {
                user_id: user.id,
                listing_id: first,
            }),
            svc.execute(ToggleFavorite {
                user_id: user.id,
                listing_id: second,
            }),
        );
        assert!(a.unwrap().added);
        assert!(b.unwrap().added);

        let favorites = stored(&db, user.id).await.favorites;
        assert_eq!(favorites.len(), 1, "lost update expected: {favorites:?}");
    }
}
