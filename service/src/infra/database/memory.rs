//! In-memory [`Database`] implementation.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, ResolvedGeometry},
        review, user, Listing, Review, User,
    },
    infra::{database, Database},
    read::listing::list,
};

/// In-memory [`Database`] client.
///
/// Clones share the same storage. Operations are applied immediately, so
/// transactions are not isolated and never roll back.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Shared [`Storage`] of this [`Memory`] client.
    storage: Arc<RwLock<Storage>>,

    /// Indicator whether this [`Memory`] client rejects writes.
    read_only: bool,
}

/// Collections kept by a [`Memory`] client.
#[derive(Debug, Default)]
struct Storage {
    /// Stored [`Listing`]s, in their storage order.
    listings: BTreeMap<listing::Id, Listing>,

    /// Stored [`Review`]s.
    reviews: HashMap<review::Id, Review>,

    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,
}

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a [`Memory`] client sharing the storage of this one, but
    /// rejecting any writes with an [`Error::ReadOnly`].
    #[must_use]
    pub fn read_only(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            read_only: true,
        }
    }

    /// Returns the [`Storage`] for writing, unless this client is read-only.
    async fn writable(
        &self,
    ) -> Result<RwLockWriteGuard<'_, Storage>, Traced<database::Error>> {
        if self.read_only {
            return Err(tracerr::new!(database::Error::from(Error::ReadOnly)));
        }
        Ok(self.storage.write().await)
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Write attempted through a read-only [`Memory`] client.
    #[display("`Memory` client is read-only")]
    ReadOnly,
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<IDs> Database<Select<By<HashMap<listing::Id, Listing>, IDs>>> for Memory
where
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let storage = self.storage.read().await;
        Ok(ids
            .as_ref()
            .iter()
            .filter_map(|id| storage.listings.get(id))
            .map(|l| (l.id, l.clone()))
            .collect())
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Memory {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.storage.read().await.listings.get(&id).cloned())
    }
}

impl Database<Select<By<list::TotalCount, list::Filter>>> for Memory {
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .storage
            .read()
            .await
            .listings
            .values()
            .filter(|l| filter.matches(l))
            .count();
        Ok(list::TotalCount::from(count as u64))
    }
}

impl Database<Select<By<Vec<Listing>, list::Slice>>> for Memory {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, list::Slice>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Slice {
            filter,
            sort,
            offset,
            limit,
        } = by.into_inner();

        let storage = self.storage.read().await;
        let mut listings = storage
            .listings
            .values()
            .filter(|l| filter.matches(l))
            .collect::<Vec<_>>();
        match sort {
            Some(list::Sort::PriceAsc) => {
                listings.sort_by(|a, b| a.price.cmp(&b.price));
            }
            Some(list::Sort::PriceDesc) => {
                listings.sort_by(|a, b| b.price.cmp(&a.price));
            }
            Some(list::Sort::Newest) => listings.reverse(),
            None => {}
        }

        Ok(listings
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

impl Database<Insert<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        drop(storage.listings.insert(listing.id, listing));
        Ok(())
    }
}

impl Database<Update<ResolvedGeometry>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(resolved): Update<ResolvedGeometry>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        Ok(match storage.listings.get_mut(&resolved.listing_id) {
            Some(listing) if resolved.fits(listing) => {
                listing.geometry = Some(resolved.geometry);
                true
            }
            Some(_) | None => false,
        })
    }
}

impl Database<Delete<By<Listing, listing::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        drop(storage.listings.remove(&id));
        Ok(())
    }
}

impl Database<Lock<By<Listing, listing::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<IDs> Database<Select<By<HashMap<review::Id, Review>, IDs>>> for Memory
where
    IDs: AsRef<[review::Id]>,
{
    type Ok = HashMap<review::Id, Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<review::Id, Review>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let storage = self.storage.read().await;
        Ok(ids
            .as_ref()
            .iter()
            .filter_map(|id| storage.reviews.get(id))
            .map(|r| (r.id, r.clone()))
            .collect())
    }
}

impl Database<Select<By<Option<Review>, review::Id>>> for Memory {
    type Ok = Option<Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Review>, review::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.storage.read().await.reviews.get(&id).cloned())
    }
}

impl Database<Insert<Review>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(review): Insert<Review>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        drop(storage.reviews.insert(review.id, review));
        Ok(())
    }
}

impl Database<Delete<By<Review, review::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Review, review::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        drop(storage.reviews.remove(&id));
        Ok(())
    }
}

impl<IDs> Database<Delete<By<Vec<Review>, IDs>>> for Memory
where
    IDs: AsRef<[review::Id]>,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Review>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        let deleted = ids
            .as_ref()
            .iter()
            .filter(|id| storage.reviews.remove(id).is_some())
            .count();
        Ok(deleted as u64)
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.storage.read().await.users.get(&id).cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        _ = storage.users.entry(user.id).or_insert(user);
        Ok(())
    }
}

impl Database<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut storage = self.writable().await.map_err(tracerr::wrap!())?;
        drop(storage.users.insert(user.id, user));
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select, Update};

    use super::Memory;
    use crate::{
        domain::{user, User},
        infra::Database as _,
    };

    #[tokio::test]
    async fn read_only_rejects_writes_but_reads() {
        let db = Memory::new();
        let user = User {
            id: user::Id::new(),
            name: user::Name::new("Alice").unwrap(),
            favorites: [].into(),
            created_at: common::DateTime::now().coerce(),
        };
        db.execute(Update(user.clone())).await.unwrap();

        let ro = db.read_only();
        assert!(ro.execute(Update(user.clone())).await.is_err());

        let found = ro
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }
}
