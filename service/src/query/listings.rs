//! [`Query`] collection related to the multiple [`Listing`]s.

use common::{
    operations::{By, Select},
    Pagination,
};
use tracerr::Traced;

use crate::{
    domain::Listing,
    infra::{database, Database},
    read::listing::list,
    Service,
};

use super::Query;

/// [`Query`] of a single catalog [`list::Page`] of [`Listing`]s.
///
/// Requesting a page beyond the last one serves the last page.
#[derive(Clone, Debug)]
pub struct List(pub list::Selector);

impl<Db, Geo> Query<List> for Service<Db, Geo>
where
    Db: Database<
            Select<By<list::TotalCount, list::Filter>>,
            Ok = list::TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Listing>, list::Slice>>,
            Ok = Vec<Listing>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List(selector): List,
    ) -> Result<Self::Ok, Self::Err> {
        let total_count = self
            .database()
            .execute(Select(By::<list::TotalCount, _>::new(
                selector.filter.clone(),
            )))
            .await
            .map_err(tracerr::wrap!())?;
        let pagination = Pagination::clamped(
            selector.page,
            list::PAGE_SIZE,
            total_count.into(),
        );

        let items = if pagination.total_count == 0 {
            vec![]
        } else {
            self.database()
                .execute(Select(By::<Vec<Listing>, _>::new(
                    selector.slice(&pagination),
                )))
                .await
                .map_err(tracerr::wrap!())?
        };

        Ok(list::Page { items, pagination })
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, PageNumber};
    use rust_decimal::Decimal;

    use super::List;
    use crate::{
        domain::{listing, Listing},
        infra::Memory,
        read::listing::list::{Page, RawParams, Selector},
        testing::{self, CountingGeocoder},
        Query as _,
    };

    async fn catalog(listings: &[Listing]) -> Memory {
        let db = Memory::new();
        for l in listings {
            db.execute(Insert(l.clone())).await.unwrap();
        }
        db
    }

    fn priced(title: &str, price: Option<i64>) -> Listing {
        let mut l = testing::listing(title);
        l.price = price.map(|p| listing::Price::new(Decimal::from(p)).unwrap());
        l
    }

    fn titles(listings: &[Listing]) -> Vec<String> {
        listings.iter().map(|l| l.title.to_string()).collect()
    }

    async fn list(db: &Memory, raw: RawParams) -> Page {
        testing::service(db.clone(), CountingGeocoder::missing())
            .execute(List(Selector::build(&raw)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn clamps_page_beyond_last() {
        let listings = (0..20)
            .map(|n| testing::listing(&format!("Listing {n}")))
            .collect::<Vec<_>>();
        let db = catalog(&listings).await;

        let page = list(&db, RawParams {
            page: Some("99".into()),
            ..RawParams::default()
        })
        .await;

        assert_eq!(page.pagination.total_count, 20);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.page, PageNumber::new(3).unwrap());
        assert_eq!(titles(&page.items), titles(&listings[18..]));
    }

    #[tokio::test]
    async fn clamps_to_full_last_page_when_divisible() {
        let listings = (0..18)
            .map(|n| testing::listing(&format!("Listing {n}")))
            .collect::<Vec<_>>();
        let db = catalog(&listings).await;

        let page = list(&db, RawParams {
            page: Some("3".into()),
            ..RawParams::default()
        })
        .await;

        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.pagination.page, PageNumber::new(2).unwrap());
        assert_eq!(page.items.len(), 9);
    }

    #[tokio::test]
    async fn serves_single_empty_page() {
        let db = Memory::new();

        let page = list(&db, RawParams {
            page: Some("5".into()),
            ..RawParams::default()
        })
        .await;

        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_count, 0);
        assert_eq!(page.pagination.total_pages, 1);
        assert_eq!(page.pagination.page, PageNumber::FIRST);
    }

    #[tokio::test]
    async fn filters_and_sorts_by_price() {
        let db = catalog(&[
            priced("A", Some(80)),
            priced("B", None),
            priced("C", Some(50)),
            priced("D", Some(120)),
            priced("E", Some(50)),
        ])
        .await;

        let page = list(&db, RawParams {
            min_price: Some("50".into()),
            max_price: Some("abc".into()),
            sort: Some("price_asc".into()),
            ..RawParams::default()
        })
        .await;
        assert_eq!(titles(&page.items), ["C", "E", "A", "D"]);

        let page = list(&db, RawParams {
            sort: Some("price_desc".into()),
            ..RawParams::default()
        })
        .await;
        assert_eq!(titles(&page.items), ["D", "A", "C", "E", "B"]);

        let page = list(&db, RawParams {
            sort: Some("newest".into()),
            ..RawParams::default()
        })
        .await;
        assert_eq!(titles(&page.items), ["E", "D", "C", "B", "A"]);

        let page = list(&db, RawParams {
            min_price: Some("100".into()),
            max_price: Some("10".into()),
            ..RawParams::default()
        })
        .await;
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[tokio::test]
    async fn ignores_unknown_category() {
        let mut castle = testing::listing("Castle");
        castle.category = listing::Category::Castles;
        let mut barn = testing::listing("Barn");
        barn.category = listing::Category::Barns;
        let db = catalog(&[castle, barn]).await;

        let page = list(&db, RawParams {
            category: Some("Spaceships".into()),
            ..RawParams::default()
        })
        .await;
        assert_eq!(page.pagination.total_count, 2);

        let page = list(&db, RawParams {
            category: Some("Barns".into()),
            ..RawParams::default()
        })
        .await;
        assert_eq!(titles(&page.items), ["Barn"]);
    }
}
