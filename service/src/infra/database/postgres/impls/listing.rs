//! [`Listing`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, Geometry, ResolvedGeometry},
        Listing,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, SubstringPattern},
            Postgres,
        },
        Database,
    },
    read::listing::list,
};

/// Columns of the `listings` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, title, description, \
    image_url, image_filename, \
    price, location, country, category, \
    longitude, latitude, \
    owner_id, review_ids, \
    created_at";

/// Builds a [`Listing`] out of the provided [`Row`] selected with
/// [`COLUMNS`].
///
/// Partially stored [`Geometry`] or [`listing::Image`] is read as absent.
fn from_row(row: &Row) -> Listing {
    let image = row
        .get::<_, Option<listing::ImageUrl>>("image_url")
        .zip(row.get::<_, Option<listing::ImageFilename>>("image_filename"))
        .map(|(url, filename)| listing::Image { url, filename });
    let geometry = row
        .get::<_, Option<f64>>("longitude")
        .zip(row.get::<_, Option<f64>>("latitude"))
        .and_then(|(lon, lat)| Geometry::from_coordinates(&[lon, lat]));

    Listing {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        image,
        price: row.get("price"),
        location: row.get("location"),
        country: row.get("country"),
        category: row.get("category"),
        geometry,
        owner: row.get("owner_id"),
        reviews: row.get("review_ids"),
        created_at: row.get("created_at"),
    }
}

/// Renders SQL conditions of the provided [`list::Filter`], pushing their
/// parameters into `ps`.
fn filter_sql<'p>(
    filter: &'p list::Filter,
    pattern: Option<&'p SubstringPattern>,
    ps: &mut Vec<&'p (dyn ToSql + Sync)>,
) -> String {
    let category_idx = filter.category.as_ref().map(|c| {
        ps.push(c);
        ps.len()
    });
    let pattern_idx = pattern.map(|p| {
        ps.push(p);
        ps.len()
    });
    let min_price_idx = filter.min_price.as_ref().map(|p| {
        ps.push(p);
        ps.len()
    });
    let max_price_idx = filter.max_price.as_ref().map(|p| {
        ps.push(p);
        ps.len()
    });

    format!(
        "WHERE true \
               {category} \
               {search} \
               {min_price} \
               {max_price}",
        category = category_idx.into_iter().format_with("", |idx, f| {
            f(&format_args!("AND category = ${idx}::VARCHAR"))
        }),
        search = pattern_idx.into_iter().format_with("", |idx, f| {
            f(&format_args!(
                "AND (location ILIKE ${idx}::VARCHAR \
                      OR country ILIKE ${idx}::VARCHAR \
                      OR title ILIKE ${idx}::VARCHAR)"
            ))
        }),
        min_price = min_price_idx.into_iter().format_with("", |idx, f| {
            f(&format_args!("AND price >= ${idx}::NUMERIC"))
        }),
        max_price = max_price_idx.into_iter().format_with("", |idx, f| {
            f(&format_args!("AND price <= ${idx}::NUMERIC"))
        }),
    )
}

/// Renders SQL `ORDER BY` expression of the provided [`list::Sort`].
fn order_sql(sort: Option<list::Sort>) -> &'static str {
    match sort {
        None => "id ASC",
        Some(list::Sort::PriceAsc) => "price ASC NULLS FIRST, id ASC",
        Some(list::Sort::PriceDesc) => "price DESC NULLS LAST, id ASC",
        Some(list::Sort::Newest) => "id DESC",
    }
}

impl<C, IDs> Database<Select<By<HashMap<listing::Id, Listing>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[listing::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).expect("too many IDs");

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4"
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let listing = from_row(row);
                (listing.id, listing)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<listing::Id, Listing>, [listing::Id; 1]>>,
        Ok = HashMap<listing::Id, Listing>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<list::TotalCount, list::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let pattern = filter
            .search
            .as_ref()
            .map(|s| SubstringPattern::new(&s.to_string()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let conditions = filter_sql(&filter, pattern.as_ref(), &mut ps);

        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM listings \
             {conditions}"
        );
        let row = self
            .query_one(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;
        let count = u64::try_from(row.get::<_, i64>(0)).unwrap_or_default();
        Ok(count.into())
    }
}

impl<C> Database<Select<By<Vec<Listing>, list::Slice>>> for Postgres<C>
where
    C: Connection,
{
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
        let pattern = filter
            .search
            .as_ref()
            .map(|s| SubstringPattern::new(&s.to_string()));
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let limit = i64::from(limit);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&offset, &limit];
        let conditions = filter_sql(&filter, pattern.as_ref(), &mut ps);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             {conditions} \
             ORDER BY {order} \
             OFFSET $1::INT8 \
             LIMIT $2::INT8",
            order = order_sql(sort),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Listing>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Listing>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let Listing {
            id,
            title,
            description,
            image,
            price,
            location,
            country,
            category,
            geometry,
            owner,
            reviews,
            created_at,
        } = listing;

        let (image_url, image_filename) =
            image.map(|i| (i.url, i.filename)).unzip();
        let (longitude, latitude) = geometry
            .map(|g| {
                let c = g.coordinates();
                (c.longitude(), c.latitude())
            })
            .unzip();

        const SQL: &str = "\
            INSERT INTO listings (\
                id, title, description, \
                image_url, image_filename, \
                price, location, country, category, \
                longitude, latitude, \
                owner_id, review_ids, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::TEXT, \
                $4::VARCHAR, $5::VARCHAR, \
                $6::NUMERIC, $7::VARCHAR, $8::VARCHAR, $9::VARCHAR, \
                $10::FLOAT8, $11::FLOAT8, \
                $12::UUID, $13::UUID[], \
                $14::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                image_url = EXCLUDED.image_url, \
                image_filename = EXCLUDED.image_filename, \
                price = EXCLUDED.price, \
                location = EXCLUDED.location, \
                country = EXCLUDED.country, \
                category = EXCLUDED.category, \
                longitude = EXCLUDED.longitude, \
                latitude = EXCLUDED.latitude, \
                review_ids = EXCLUDED.review_ids";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &image_url,
                &image_filename,
                &price,
                &location,
                &country,
                &category,
                &longitude,
                &latitude,
                &owner,
                &reviews,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<ResolvedGeometry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(resolved): Update<ResolvedGeometry>,
    ) -> Result<Self::Ok, Self::Err> {
        let ResolvedGeometry {
            listing_id,
            location,
            country,
            geometry,
        } = resolved;
        let coordinates = geometry.coordinates();
        let (longitude, latitude) =
            (coordinates.longitude(), coordinates.latitude());

        const SQL: &str = "\
            UPDATE listings \
            SET longitude = $4::FLOAT8, \
                latitude = $5::FLOAT8 \
            WHERE id = $1::UUID \
              AND location IS NOT DISTINCT FROM $2::VARCHAR \
              AND country IS NOT DISTINCT FROM $3::VARCHAR";
        self.exec(
            SQL,
            &[&listing_id, &location, &country, &longitude, &latitude],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|updated| updated > 0)
    }
}

impl<C> Database<Delete<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM listings \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM listings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
