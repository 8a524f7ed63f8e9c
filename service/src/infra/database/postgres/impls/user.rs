//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{listing, user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, favorites, created_at \
            FROM users \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| User {
                id: row.get("id"),
                name: row.get("name"),
                favorites: row
                    .get::<_, Vec<listing::Id>>("favorites")
                    .into_iter()
                    .collect(),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            favorites,
            created_at,
        } = user;
        let favorites = favorites.into_iter().collect::<Vec<_>>();

        const SQL: &str = "\
            INSERT INTO users (id, name, favorites, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::UUID[], $4::TIMESTAMPTZ) \
            ON CONFLICT (id) DO NOTHING";
        self.exec(SQL, &[&id, &name, &favorites, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            name,
            favorites,
            created_at,
        } = user;
        let favorites = favorites.into_iter().collect::<Vec<_>>();

        const SQL: &str = "\
            INSERT INTO users (id, name, favorites, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::UUID[], $4::TIMESTAMPTZ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                favorites = EXCLUDED.favorites";
        self.exec(SQL, &[&id, &name, &favorites, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
