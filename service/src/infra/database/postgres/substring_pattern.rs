//! [`SubstringPattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// `LIKE` pattern matching the provided text literally anywhere inside a
/// value.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct SubstringPattern(String);

impl SubstringPattern {
    /// Creates a new [`SubstringPattern`] out of the given `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self(format!(
            "%{}%",
            input
                .replace('\\', r"\\")
                .replace('%', r"\%")
                .replace('_', r"\_"),
        ))
    }
}

#[cfg(test)]
mod spec {
    use super::SubstringPattern;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(SubstringPattern::new("goa").to_string(), "%goa%");
        assert_eq!(
            SubstringPattern::new(r"100%_off\").to_string(),
            r"%100\%\_off\\%",
        );
        assert_eq!(SubstringPattern::new("a.b*").to_string(), "%a.b*%");
    }
}
