//! [`Listing`]-related read definitions.

#[cfg(doc)]
use crate::domain::Listing;

pub mod list {
    //! [`Listing`]s catalog definitions.

    use std::num::NonZeroU32;

    use common::{define_kind, pagination, PageNumber, Pagination};
    use derive_more::{AsRef, Display, From, Into};
    use rust_decimal::Decimal;

    use crate::domain::{listing, Listing};

    /// Number of [`Listing`]s on a single catalog [`Page`].
    pub const PAGE_SIZE: NonZeroU32 = NonZeroU32::MIN.saturating_add(8);

    /// Untrusted catalog parameters, exactly as provided by a client.
    #[derive(Clone, Debug, Default)]
    pub struct RawParams {
        /// Requested [`listing::Category`].
        pub category: Option<String>,

        /// Text to search for.
        pub q: Option<String>,

        /// Lower bound of a [`listing::Price`].
        pub min_price: Option<String>,

        /// Upper bound of a [`listing::Price`].
        pub max_price: Option<String>,

        /// Requested [`Sort`] token.
        pub sort: Option<String>,

        /// Requested [`PageNumber`].
        pub page: Option<String>,
    }

    /// Validated catalog query: what to filter, how to order and which page
    /// to serve.
    ///
    /// Keeps only the parameters that were actually applied, so it can be
    /// echoed back to a client as the active filters.
    #[derive(Clone, Debug, Default)]
    pub struct Selector {
        /// [`Filter`] to apply.
        pub filter: Filter,

        /// [`Sort`] to apply, if any.
        pub sort: Option<Sort>,

        /// Requested [`PageNumber`].
        ///
        /// May exceed the number of available pages.
        pub page: PageNumber,
    }

    impl Selector {
        /// Builds a [`Selector`] out of the provided [`RawParams`].
        ///
        /// Never fails: invalid parameters are dropped.
        #[must_use]
        pub fn build(raw: &RawParams) -> Self {
            Self {
                filter: Filter {
                    category: raw
                        .category
                        .as_deref()
                        .and_then(|c| c.parse().ok()),
                    search: raw.q.as_deref().and_then(Search::new),
                    min_price: raw.min_price.as_deref().and_then(parse_bound),
                    max_price: raw.max_price.as_deref().and_then(parse_bound),
                },
                sort: raw.sort.as_deref().and_then(|s| s.parse().ok()),
                page: raw.page.as_deref().map(parse_page).unwrap_or_default(),
            }
        }

        /// Returns the [`Slice`] of the catalog to fetch for the provided
        /// resolved [`Pagination`].
        #[must_use]
        pub fn slice(&self, pagination: &Pagination) -> Slice {
            Slice {
                filter: self.filter.clone(),
                sort: self.sort,
                offset: pagination.offset(),
                limit: pagination.limit(),
            }
        }
    }

    /// Filter of the catalog [`Listing`]s.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`listing::Category`] the [`Listing`]s must belong to.
        pub category: Option<listing::Category>,

        /// [`Search`] the [`Listing`]s must match.
        pub search: Option<Search>,

        /// Lowest [`listing::Price`] of the [`Listing`]s, inclusive.
        pub min_price: Option<Decimal>,

        /// Highest [`listing::Price`] of the [`Listing`]s, inclusive.
        pub max_price: Option<Decimal>,
    }

    impl Filter {
        /// Checks whether the provided [`Listing`] passes this [`Filter`].
        ///
        /// A [`Listing`] without a [`listing::Price`] never passes a price
        /// bound.
        #[must_use]
        pub fn matches(&self, listing: &Listing) -> bool {
            let price = listing.price.map(listing::Price::amount);

            self.category.map_or(true, |c| c == listing.category)
                && self.search.as_ref().map_or(true, |s| {
                    [
                        listing.location.as_ref().map(AsRef::<str>::as_ref),
                        listing.country.as_ref().map(AsRef::<str>::as_ref),
                        Some(AsRef::<str>::as_ref(&listing.title)),
                    ]
                    .into_iter()
                    .flatten()
                    .any(|text| s.matches(text))
                })
                && self
                    .min_price
                    .map_or(true, |min| price.is_some_and(|p| p >= min))
                && self
                    .max_price
                    .map_or(true, |max| price.is_some_and(|p| p <= max))
        }
    }

    /// Text to search for in a location, a country or a title of a
    /// [`Listing`].
    ///
    /// Matched literally, as a case-insensitive substring.
    #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
    #[as_ref(forward)]
    pub struct Search(String);

    impl Search {
        /// Creates a new [`Search`] out of the provided raw `text`.
        ///
        /// [`None`] is returned if there is nothing to search for.
        #[must_use]
        pub fn new(text: &str) -> Option<Self> {
            let text = text.trim();
            (!text.is_empty()).then(|| Self(text.to_owned()))
        }

        /// Checks whether the provided `text` contains this [`Search`],
        /// ignoring case.
        #[must_use]
        pub fn matches(&self, text: &str) -> bool {
            text.to_lowercase().contains(&self.0.to_lowercase())
        }
    }

    define_kind! {
        #[doc = "Order of the catalog [`Listing`]s."]
        enum Sort {
            #[doc = "Cheapest first."]
            PriceAsc = "price_asc",

            #[doc = "Most expensive first."]
            PriceDesc = "price_desc",

            #[doc = "Most recently created first."]
            Newest = "newest",
        }
    }

    /// Exact portion of the filtered and ordered catalog to fetch.
    #[derive(Clone, Debug)]
    pub struct Slice {
        /// [`Filter`] to apply.
        pub filter: Filter,

        /// [`Sort`] to apply, if any.
        ///
        /// Without one, [`Listing`]s are returned in their storage order.
        pub sort: Option<Sort>,

        /// Number of [`Listing`]s to skip.
        pub offset: u64,

        /// Maximum number of [`Listing`]s to return.
        pub limit: u32,
    }

    /// Total count of [`Listing`]s passing a [`Filter`].
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(u64);

    /// Single page of the catalog.
    pub type Page = pagination::Page<Listing>;

    /// Parses the provided raw price `bound`.
    ///
    /// Out-of-range finite numbers saturate.
    fn parse_bound(bound: &str) -> Option<Decimal> {
        let n = bound.trim().parse::<f64>().ok().filter(|n| n.is_finite())?;
        Some(Decimal::try_from(n).unwrap_or(if n < 0.0 {
            Decimal::MIN
        } else {
            Decimal::MAX
        }))
    }

    /// Parses the provided raw `page` number by its leading digits.
    ///
    /// Falls back to the [`PageNumber::FIRST`] when no positive number is
    /// provided.
    fn parse_page(page: &str) -> PageNumber {
        let page = page.trim();
        let (negative, page) = match page.as_bytes().first() {
            Some(b'-') => (true, &page[1..]),
            Some(b'+') => (false, &page[1..]),
            _ => (false, page),
        };
        let digits = page.len()
            - page.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if negative || digits == 0 {
            return PageNumber::FIRST;
        }
        let num = page[..digits].parse::<u32>().unwrap_or(u32::MAX);
        PageNumber::new(num).unwrap_or_default()
    }

    #[cfg(test)]
    mod spec {
        use common::{DateTime, PageNumber};
        use rust_decimal::Decimal;

        use super::{RawParams, Search, Selector, Sort};
        use crate::domain::{listing, user, Listing};

        fn params(f: impl FnOnce(&mut RawParams)) -> Selector {
            let mut raw = RawParams::default();
            f(&mut raw);
            Selector::build(&raw)
        }

        fn listing(title: &str, location: &str, price: Option<u32>) -> Listing {
            Listing {
                id: listing::Id::new(),
                title: listing::Title::new(title).unwrap(),
                description: None,
                image: None,
                price: price.map(|p| listing::Price::new(p.into()).unwrap()),
                location: listing::Location::new(location),
                country: listing::Country::new("Italy"),
                category: listing::Category::Castles,
                geometry: None,
                owner: user::Id::new(),
                reviews: vec![],
                created_at: DateTime::now().coerce(),
            }
        }

        #[test]
        fn drops_unknown_category() {
            let s = params(|r| r.category = Some("Spaceships".into()));
            assert_eq!(s.filter.category, None);

            let s = params(|r| r.category = Some("castles".into()));
            assert_eq!(s.filter.category, None);

            let s = params(|r| r.category = Some("Castles".into()));
            assert_eq!(s.filter.category, Some(listing::Category::Castles));
        }

        #[test]
        fn drops_malformed_price_bound() {
            let s = params(|r| {
                r.min_price = Some("50".into());
                r.max_price = Some("abc".into());
            });
            assert_eq!(s.filter.min_price, Some(Decimal::from(50)));
            assert_eq!(s.filter.max_price, None);

            let s = params(|r| {
                r.min_price = Some("  ".into());
                r.max_price = Some(" 120.5 ".into());
            });
            assert_eq!(s.filter.min_price, None);
            assert_eq!(s.filter.max_price, Some(Decimal::new(1205, 1)));

            let s = params(|r| r.max_price = Some("inf".into()));
            assert_eq!(s.filter.max_price, None);
            let s = params(|r| r.min_price = Some("NaN".into()));
            assert_eq!(s.filter.min_price, None);
        }

        #[test]
        fn falls_back_to_first_page() {
            for raw in ["0", "xyz", "-3", "", "  "] {
                let s = params(|r| r.page = Some(raw.into()));
                assert_eq!(s.page, PageNumber::FIRST, "page: {raw:?}");
            }
            assert_eq!(params(|_| {}).page, PageNumber::FIRST);

            let s = params(|r| r.page = Some(" 3 ".into()));
            assert_eq!(s.page.get(), 3);
            let s = params(|r| r.page = Some("4th".into()));
            assert_eq!(s.page.get(), 4);
        }

        #[test]
        fn parses_sort_tokens() {
            let s = params(|r| r.sort = Some("price_desc".into()));
            assert_eq!(s.sort, Some(Sort::PriceDesc));

            let s = params(|r| r.sort = Some("cheapest".into()));
            assert_eq!(s.sort, None);
        }

        #[test]
        fn trims_search() {
            let s = params(|r| r.q = Some("  goa ".into()));
            assert_eq!(s.filter.search, Search::new("goa"));
            assert_eq!(s.filter.search.unwrap().to_string(), "goa");

            let s = params(|r| r.q = Some("   ".into()));
            assert_eq!(s.filter.search, None);
        }

        #[test]
        fn searches_literally_ignoring_case() {
            let castle = listing("Old Castle", "Florence", Some(100));

            for q in ["florence", "ITALY", "castle", "d c"] {
                let s = params(|r| r.q = Some(q.into()));
                assert!(s.filter.matches(&castle), "q: {q:?}");
            }
            for q in ["flor.nce", "%", "Rome"] {
                let s = params(|r| r.q = Some(q.into()));
                assert!(!s.filter.matches(&castle), "q: {q:?}");
            }
        }

        #[test]
        fn price_bounds_skip_unpriced() {
            let cheap = listing("Cheap", "Pisa", Some(40));
            let mid = listing("Mid", "Pisa", Some(50));
            let unpriced = listing("Unpriced", "Pisa", None);

            let s = params(|r| r.min_price = Some("50".into()));
            assert!(!s.filter.matches(&cheap));
            assert!(s.filter.matches(&mid));
            assert!(!s.filter.matches(&unpriced));

            let s = params(|r| r.max_price = Some("45".into()));
            assert!(s.filter.matches(&cheap));
            assert!(!s.filter.matches(&mid));
            assert!(!s.filter.matches(&unpriced));

            let s = params(|_| {});
            assert!(s.filter.matches(&unpriced));
        }

        #[test]
        fn inverted_bounds_match_nothing() {
            let s = params(|r| {
                r.min_price = Some("100".into());
                r.max_price = Some("10".into());
            });
            assert!(!s.filter.matches(&listing("A", "Pisa", Some(50))));
            assert!(!s.filter.matches(&listing("B", "Pisa", Some(100))));
        }
    }
}
