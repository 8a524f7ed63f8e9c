//! [`User`] definitions.

pub mod session;

use std::collections::HashSet;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::listing;
#[cfg(doc)]
use crate::domain::Listing;

pub use self::session::Session;

/// Platform user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// IDs of the [`Listing`]s this [`User`] marked as favorite.
    pub favorites: HashSet<listing::Id>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

impl User {
    /// Toggles the provided [`Listing`] in the favorites of this [`User`].
    ///
    /// Returns `true` if the [`Listing`] was added, or `false` if removed.
    pub fn toggle_favorite(&mut self, listing_id: listing::Id) -> bool {
        if self.favorites.remove(&listing_id) {
            false
        } else {
            self.favorites.insert(listing_id)
        }
    }
}

/// ID of a [`User`].
///
/// Assigned by the identity provider issuing [`Session`]s.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use common::DateTime;

    use super::{Id, Name, User};
    use crate::domain::listing;

    #[test]
    fn toggling_twice_restores_favorites() {
        let kept = listing::Id::new();
        let mut user = User {
            id: Id::new(),
            name: Name::new("Alice").unwrap(),
            favorites: HashSet::from([kept]),
            created_at: DateTime::now().coerce(),
        };
        let toggled = listing::Id::new();

        assert!(user.toggle_favorite(toggled));
        assert_eq!(user.favorites, HashSet::from([kept, toggled]));

        assert!(!user.toggle_favorite(toggled));
        assert_eq!(user.favorites, HashSet::from([kept]));
    }

    #[test]
    fn name_rejects_untrimmed() {
        assert!(Name::new("Bob").is_some());
        assert!(Name::new(" Bob").is_none());
        assert!(Name::new("").is_none());
    }
}
