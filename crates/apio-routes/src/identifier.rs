//! Path identifier parsing.

use std::fmt::Display;
use std::str::FromStr;

use apio_core::{ApioError, ApioResult, ResourceType};

/// Parses `raw` as an `I` through its `FromStr` implementation.
///
/// # Errors
///
/// Returns a bad request error naming the expected type when `raw` does not
/// parse.
///
/// # Example
///
/// ```
/// use apio_routes::parse_identifier;
///
/// assert_eq!(parse_identifier::<i64>("42").unwrap(), 42);
/// assert!(parse_identifier::<i64>("forty-two").is_err());
/// ```
pub fn parse_identifier<I>(raw: &str) -> ApioResult<I>
where
    I: FromStr + 'static,
    I::Err: Display,
{
    raw.parse::<I>().map_err(|e| {
        ApioError::invalid_parameter(
            "id",
            format!(
                "cannot parse '{raw}' as {}: {e}",
                ResourceType::of::<I>().short_name()
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use apio_core::ErrorCategory;

    #[test]
    fn test_parse_identifier_names_type() {
        let error = parse_identifier::<u64>("-1").unwrap_err();

        assert!(error.is(ErrorCategory::BadRequest));
        assert!(error.to_string().contains("u64"));
        assert!(error.to_string().contains("'-1'"));
    }

    #[test]
    fn test_parse_identifier_accepts_strings() {
        assert_eq!(parse_identifier::<String>("slug").unwrap(), "slug");
    }
}
