//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Represents the target type as a GraphQL string, going through the
/// [`FromStr`]/[`Display`] impls of the `As` type, so the domain validation
/// of `As` applies to every input.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Converts the target type into a string scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from a string scalar [`InputValue`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input value is not a string;
    /// - the input value is rejected by the [`FromStr`] impl of `As` type;
    /// - the parsed value cannot be converted into the target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("<unnamed>");
        let s = input.as_string_value().ok_or_else(|| {
            format!("Expected `{name}` string, found: {input}")
        })?;
        s.parse::<As>()
            .map_err(|e| format!("Invalid `{name}` \"{s}\": {e}"))?
            .try_into()
            .map_err(|e| format!("Invalid `{name}` \"{s}\": {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be parsed as [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, FromInputValue as _, InputValue};

    use crate::api::listing;

    fn parse(value: &str) -> Result<listing::Title, String> {
        listing::Title::from_input_value(
            &InputValue::<DefaultScalarValue>::scalar(value.to_owned()),
        )
        .map_err(|e| e.message().to_owned())
    }

    #[test]
    fn applies_domain_validation() {
        assert_eq!(parse("Cozy cabin").unwrap().to_string(), "Cozy cabin");

        let err = parse("  ").unwrap_err();
        assert!(err.contains("ListingTitle"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_non_string_input() {
        let input = InputValue::<DefaultScalarValue>::scalar(42);
        assert!(listing::Title::from_input_value(&input).is_err());
    }
}
