//! [`Listing`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{review, user};
#[cfg(doc)]
use crate::domain::{Review, User};

/// Place offered in the catalog.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// [`Title`] of this [`Listing`].
    pub title: Title,

    /// [`Description`] of this [`Listing`], if any.
    pub description: Option<Description>,

    /// [`Image`] of this [`Listing`], if any.
    pub image: Option<Image>,

    /// [`Price`] of this [`Listing`], if any.
    pub price: Option<Price>,

    /// [`Location`] of this [`Listing`], if any.
    pub location: Option<Location>,

    /// [`Country`] of this [`Listing`], if any.
    pub country: Option<Country>,

    /// [`Category`] of this [`Listing`].
    pub category: Category,

    /// [`Geometry`] of this [`Listing`], once resolved.
    pub geometry: Option<Geometry>,

    /// ID of the [`User`] owning this [`Listing`].
    pub owner: user::Id,

    /// IDs of the [`Review`]s left on this [`Listing`], in the order they were
    /// left.
    ///
    /// These [`Review`]s are owned by this [`Listing`] and are deleted along
    /// with it.
    pub reviews: Vec<review::Id>,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,
}

impl Listing {
    /// Indicates whether this [`Listing`] still misses its [`Geometry`].
    #[must_use]
    pub fn needs_geometry(&self) -> bool {
        self.geometry.is_none()
    }

    /// Returns the [`Place`] to look up the [`Geometry`] of this [`Listing`]
    /// by, if there is anything to look up.
    #[must_use]
    pub fn place(&self) -> Option<Place> {
        Place::new(self.location.as_ref(), self.country.as_ref())
    }
}

/// ID of a [`Listing`].
///
/// Time-ordered, so the order of [`Id`]s matches the creation order of
/// [`Listing`]s.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new [`Id`] ordered after all the previously created ones.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

/// Title of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.len() <= 8192
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Location of a [`Listing`] in a free form (a city, a district, an address).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 512
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

/// Country of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Country(String);

impl Country {
    /// Creates a new [`Country`] if the given `country` is valid.
    #[must_use]
    pub fn new(country: impl Into<String>) -> Option<Self> {
        let country = country.into();
        Self::check(&country).then_some(Self(country))
    }

    /// Checks whether the given `country` is a valid [`Country`].
    fn check(country: impl AsRef<str>) -> bool {
        let country = country.as_ref();
        country.trim() == country && !country.is_empty() && country.len() <= 512
    }
}

impl FromStr for Country {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Country`")
    }
}

/// Price of a [`Listing`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is not negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Price`")
    }
}

/// Uploaded image of a [`Listing`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    /// [`ImageUrl`] the image is served from.
    pub url: ImageUrl,

    /// [`ImageFilename`] the image is kept under in the upload storage.
    pub filename: ImageFilename,
}

impl Image {
    /// Path of the image shown for a [`Listing`] without an [`Image`].
    pub const PLACEHOLDER: &'static str = "/images/placeholder.svg";

    /// Returns URL of a downscaled version of this [`Image`].
    ///
    /// The upload CDN resizes images requested with a `w_{width}`
    /// transformation right after the `/upload` path segment.
    #[must_use]
    pub fn thumbnail_url(&self) -> String {
        let url: &str = self.url.as_ref();
        url.replacen("/upload", "/upload/w_250", 1)
    }
}

/// URL of an [`Image`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        !url.is_empty()
            && url.len() <= 2048
            && !url.contains(char::is_whitespace)
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

/// Name of an [`Image`] in the upload storage.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ImageFilename(String);

impl ImageFilename {
    /// Creates a new [`ImageFilename`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`ImageFilename`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for ImageFilename {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageFilename`")
    }
}

/// Geographic shape of a [`Listing`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// Single point on the map.
    Point(Coordinates),
}

impl Geometry {
    /// Returns the name of this [`Geometry`] type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
        }
    }

    /// Returns [`Coordinates`] of this [`Geometry`].
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        match self {
            Self::Point(c) => *c,
        }
    }

    /// Creates a [`Geometry::Point`] out of the provided raw coordinates in
    /// `[longitude, latitude]` order.
    ///
    /// [`None`] is returned unless exactly 2 valid coordinates are provided.
    #[must_use]
    pub fn from_coordinates(coordinates: &[f64]) -> Option<Self> {
        match *coordinates {
            [longitude, latitude] => {
                Coordinates::new(longitude, latitude).map(Self::Point)
            }
            _ => None,
        }
    }
}

/// WGS 84 coordinates of a [`Geometry::Point`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    /// Longitude in degrees.
    longitude: f64,

    /// Latitude in degrees.
    latitude: f64,
}

impl Coordinates {
    /// Creates new [`Coordinates`] if both values are finite and in range.
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Option<Self> {
        ((-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude))
        .then_some(Self {
            longitude,
            latitude,
        })
    }

    /// Returns longitude of these [`Coordinates`].
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns latitude of these [`Coordinates`].
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns these [`Coordinates`] in `[longitude, latitude]` order.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// [`Geometry`] resolved for a [`Listing`] while it had the recorded
/// [`Location`] and [`Country`].
///
/// Storing it affects only the [`Listing::geometry`], and only while the
/// [`Listing`] still exists at the same [`Location`] and [`Country`].
#[derive(Clone, Debug)]
pub struct ResolvedGeometry {
    /// ID of the [`Listing`] the [`Geometry`] was resolved for.
    pub listing_id: Id,

    /// [`Location`] the [`Geometry`] was resolved at.
    pub location: Option<Location>,

    /// [`Country`] the [`Geometry`] was resolved at.
    pub country: Option<Country>,

    /// Resolved [`Geometry`] itself.
    pub geometry: Geometry,
}

impl ResolvedGeometry {
    /// Creates a new [`ResolvedGeometry`] of the provided [`Listing`] at its
    /// current [`Location`] and [`Country`].
    #[must_use]
    pub fn of(listing: &Listing, geometry: Geometry) -> Self {
        Self {
            listing_id: listing.id,
            location: listing.location.clone(),
            country: listing.country.clone(),
            geometry,
        }
    }

    /// Indicates whether this [`ResolvedGeometry`] still fits the provided
    /// [`Listing`].
    #[must_use]
    pub fn fits(&self, listing: &Listing) -> bool {
        self.listing_id == listing.id
            && self.location == listing.location
            && self.country == listing.country
    }
}

/// Free-form description of a place to look a [`Geometry`] up by.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Place(String);

impl Place {
    /// Creates a new [`Place`] joining the provided [`Location`] and
    /// [`Country`].
    ///
    /// [`None`] is returned if there is nothing to join.
    #[must_use]
    pub fn new(
        location: Option<&Location>,
        country: Option<&Country>,
    ) -> Option<Self> {
        let parts = [
            location.map(AsRef::<str>::as_ref),
            country.map(AsRef::<str>::as_ref),
        ];
        let place = parts.into_iter().flatten().collect::<Vec<_>>().join(", ");
        (!place.is_empty()).then_some(Self(place))
    }
}

define_kind! {
    #[doc = "Category of a [`Listing`]."]
    enum Category {
        Trending = "Trending",
        Rooms = "Rooms",
        IconicCities = "Iconic Cities",
        Mountains = "Mountains",
        Castles = "Castles",
        AmazingPool = "Amazing Pool",
        Camping = "Camping",
        Farms = "Farms",
        Arctic = "Arctic",
        Beach = "Beach",
        Domes = "Domes",
        HouseBoat = "HouseBoat",
        AFrames = "A-frames",
        AmazingViews = "Amazing views",
        Barns = "Barns",
        Beachfront = "Beachfront",
        BedAndBreakfasts = "Bed & breakfasts",
        Boats = "Boats",
        Cabins = "Cabins",
        Campers = "Campers",
        CasasParticulares = "Casas particulers",
        Caves = "Caves",
        ChefsKitchen = "Chief's kitchen",
        Containers = "Containers",
        Countryside = "Countryside",
        CreativeSpaces = "Cretive spaces",
        CycladicHome = "Cycladic home",
        Dammusos = "Dammusos",
        Desert = "Desert",
        Design = "Design",
        EarthHomes = "Earth homes",
        Golfing = "Golfing",
        GrandPianos = "Grand pianos",
        HistoricalHomes = "Historicals homes",
        HouseBoats = "HouseBoats",
        Islands = "islands",
        Kezhans = "Kezhans",
        Lake = "Lake",
        Lakefront = "Lakefront",
        Luxe = "Luxe",
        Mansions = "Mansions",
        Minsus = "Minsus",
        NationalParks = "National Parks",
        OffTheGrid = "Off-the-grid",
        Omg = "OMG!",
        Riads = "Riads",
        Ryokans = "Ryokans",
        SharedHomes = "Shared homes",
        ShepherdsHuts = "shepherd's huts",
        SkiInOut = "Sky-in/out",
        Skiing = "Skiing",
        Surfing = "Surfing",
        TinyHomes = "Tiny homes",
        Towers = "Towers",
        Treehouses = "Treehouses",
        Tropical = "Tropical",
        Trulli = "Trulli",
        Vineyards = "Vineyards",
        Windmills = "Windmills",
        Yurts = "Yurts",
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Category, Country, Geometry, Image, Location, Place};

    #[test]
    fn category_accepts_exact_values_only() {
        assert_eq!("Iconic Cities".parse(), Ok(Category::IconicCities));
        assert_eq!("islands".parse(), Ok(Category::Islands));
        assert_eq!("OMG!".parse(), Ok(Category::Omg));

        assert!("iconic cities".parse::<Category>().is_err());
        assert!("Islands".parse::<Category>().is_err());
        assert!("Spaceships".parse::<Category>().is_err());
        assert_eq!(Category::ALL.len(), 60);
        assert_eq!(Category::ALL.first(), Some(&Category::Trending));
    }

    #[test]
    fn place_joins_present_parts() {
        let location = Location::new("Goa").unwrap();
        let country = Country::new("India").unwrap();

        assert_eq!(
            Place::new(Some(&location), Some(&country)).unwrap().to_string(),
            "Goa, India",
        );
        assert_eq!(
            Place::new(None, Some(&country)).unwrap().to_string(),
            "India",
        );
        assert_eq!(
            Place::new(Some(&location), None).unwrap().to_string(),
            "Goa",
        );
        assert_eq!(Place::new(None, None), None);
    }

    #[test]
    fn geometry_requires_exactly_two_valid_coordinates() {
        let point = Geometry::from_coordinates(&[73.8, 15.3]).unwrap();
        assert_eq!(point.type_name(), "Point");
        assert_eq!(point.coordinates().to_array(), [73.8, 15.3]);

        assert_eq!(Geometry::from_coordinates(&[]), None);
        assert_eq!(Geometry::from_coordinates(&[73.8]), None);
        assert_eq!(Geometry::from_coordinates(&[73.8, 15.3, 0.0]), None);
        assert_eq!(Geometry::from_coordinates(&[f64::NAN, 15.3]), None);
        assert_eq!(Geometry::from_coordinates(&[200.0, 15.3]), None);
    }

    #[test]
    fn thumbnail_resizes_upload() {
        let image = Image {
            url: "https://cdn.example.com/img/upload/v1/stay.jpg"
                .parse()
                .unwrap(),
            filename: "stay".parse().unwrap(),
        };

        assert_eq!(
            image.thumbnail_url(),
            "https://cdn.example.com/img/upload/w_250/v1/stay.jpg",
        );
    }
}
