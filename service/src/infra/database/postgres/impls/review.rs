//! [`Review`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{review, Review},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C, IDs> Database<Select<By<HashMap<review::Id, Review>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[review::Id]>,
{
    type Ok = HashMap<review::Id, Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<review::Id, Review>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[review::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).expect("too many IDs");

        const SQL: &str = "\
            SELECT id, comment, rating, author_id, created_at \
            FROM reviews \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Review {
                        id,
                        comment: row.get("comment"),
                        rating: row.get("rating"),
                        author: row.get("author_id"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Review>, review::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<review::Id, Review>, [review::Id; 1]>>,
        Ok = HashMap<review::Id, Review>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Review>, review::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Review>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(review): Insert<Review>,
    ) -> Result<Self::Ok, Self::Err> {
        let Review {
            id,
            comment,
            rating,
            author,
            created_at,
        } = review;

        const SQL: &str = "\
            INSERT INTO reviews (id, comment, rating, author_id, created_at) \
            VALUES (\
                $1::UUID, $2::TEXT, $3::INT2, $4::UUID, $5::TIMESTAMPTZ\
            )";
        self.exec(SQL, &[&id, &comment, &rating, &author, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Review, review::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Review, review::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: review::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM reviews \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C, IDs> Database<Delete<By<Vec<Review>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[review::Id]>,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Review>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[review::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(0);
        }

        const SQL: &str = "\
            DELETE FROM reviews \
            WHERE id = ANY($1::UUID[])";
        self.exec(SQL, &[&ids]).await.map_err(tracerr::wrap!())
    }
}
