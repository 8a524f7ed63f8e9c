//! [`Review`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{Listing, User};

/// Review left on a [`Listing`].
#[derive(Clone, Debug)]
pub struct Review {
    /// ID of this [`Review`].
    pub id: Id,

    /// [`Comment`] of this [`Review`].
    pub comment: Comment,

    /// [`Rating`] of this [`Review`].
    pub rating: Rating,

    /// ID of the [`User`] who left this [`Review`].
    pub author: user::Id,

    /// [`DateTime`] when this [`Review`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Review`].
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

/// Comment of a [`Review`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Comment(String);

impl Comment {
    /// Creates a new [`Comment`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Comment`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.len() <= 2048
    }
}

impl FromStr for Comment {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Comment`")
    }
}

/// Rating of a [`Review`], from `1` to `5` stars.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Rating(i16);

impl Rating {
    /// Lowest possible [`Rating`].
    pub const MIN: Self = Self(1);

    /// Highest possible [`Rating`].
    pub const MAX: Self = Self(5);

    /// Creates a new [`Rating`] if the given number of `stars` is in range.
    #[must_use]
    pub fn new(stars: i16) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&stars)
            .then_some(Self(stars))
    }

    /// Returns the number of stars of this [`Rating`].
    #[must_use]
    pub const fn stars(self) -> i16 {
        self.0
    }
}

/// [`DateTime`] when a [`Review`] was created.
pub type CreationDateTime = DateTimeOf<(Review, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Comment, Rating};

    #[test]
    fn rating_is_one_to_five() {
        assert_eq!(Rating::new(0), None);
        assert_eq!(Rating::new(6), None);
        assert_eq!(Rating::new(1), Some(Rating::MIN));
        assert_eq!(Rating::new(5), Some(Rating::MAX));
    }

    #[test]
    fn comment_must_have_text() {
        assert!(Comment::new("Cozy place").is_some());
        assert!(Comment::new("   ").is_none());
        assert!(Comment::new("x".repeat(2049)).is_none());
    }
}
