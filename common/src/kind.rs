//! Macros for defining closed kind enums.

/// Macro for defining a kind enum over a closed set of string literals.
///
/// Generated enum:
/// - parses only from the exact (case-sensitive) literal of its variants;
/// - displays as that literal;
/// - lists all its variants in the declaration order via `ALL` constant;
/// - documents each variant with its literal;
/// - is stored as a `VARCHAR` in Postgres (if `postgres` feature is enabled).
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
/// #
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube."]
///         Cube = "cube",
///
///         #[doc = "A sphere."]
///         Sphere = "Big sphere",
///     }
/// }
///
/// assert_eq!("Big sphere".parse::<Kind>().ok(), Some(Kind::Sphere));
/// assert!("big sphere".parse::<Kind>().is_err());
/// assert_eq!(Kind::ALL, &[Kind::Cube, Kind::Sphere]);
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                $(#[doc = $variant_doc:literal])*
                $variant:ident = $value:literal
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        pub enum $name {
            $(
                $(#[doc = $variant_doc])*
                #[doc = ::core::concat!("\n\nRepresented as `", $value, "`.")]
                #[strum(serialize = $value)]
                $variant,
            )*
        }

        impl $name {
            /// All the variants in their declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Returns the literal representation of this value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)*
                }
            }

            /// Checks whether the provided `value` is exactly a literal of
            /// one of the variants.
            #[must_use]
            pub fn is_member(value: &str) -> bool {
                Self::ALL.iter().any(|v| v.as_str() == value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(VARCHAR, TEXT);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let value = <&str as $crate::private::postgres_types::FromSql<'a>>::from_sql(
                    ty, raw,
                )?;
                value.parse().map_err(|_| {
                    ::std::format!(
                        "invalid `{}` value: {value}",
                        ::core::stringify!($name),
                    )
                    .into()
                })
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(VARCHAR, TEXT);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                <&str as $crate::private::postgres_types::ToSql>::to_sql(
                    &self.as_str(),
                    ty,
                    w,
                )
            }
        }
    };
}

#[cfg(test)]
mod spec {
    crate::define_kind! {
        #[doc = "Test kind."]
        enum Kind {
            #[doc = "First."]
            First = "First one",

            #[doc = "Second."]
            Second = "second",

            #[doc = "Quoted."]
            Quoted = "Chief's kitchen",
        }
    }

    #[test]
    fn parses_exact_literals_only() {
        assert_eq!("First one".parse::<Kind>().ok(), Some(Kind::First));
        assert_eq!("Chief's kitchen".parse::<Kind>().ok(), Some(Kind::Quoted));

        assert!("first one".parse::<Kind>().is_err());
        assert!("Second".parse::<Kind>().is_err());
        assert!(" second".parse::<Kind>().is_err());
        assert!("".parse::<Kind>().is_err());
    }

    #[test]
    fn displays_literal() {
        assert_eq!(Kind::First.to_string(), "First one");
        assert_eq!(Kind::Quoted.as_str(), "Chief's kitchen");
    }

    #[test]
    fn lists_variants_in_order() {
        assert_eq!(Kind::ALL, &[Kind::First, Kind::Second, Kind::Quoted]);
        assert!(Kind::is_member("second"));
        assert!(!Kind::is_member("Third"));
    }
}
