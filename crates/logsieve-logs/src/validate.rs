//! Query parameter validation.

use once_cell::sync::Lazy;
use regex::Regex;

use logsieve_types::QueryParams;

use crate::error::{QueryError, Result};
use crate::filter::QueryFilter;

/// Status codes: one or more ASCII digits.
static CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap_or_else(|_| unreachable!()));

/// Methods: one or more ASCII letters.
static METHOD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap_or_else(|_| unreachable!()));

/// Users: one or more ASCII letters or underscores.
static USER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_]+$").unwrap_or_else(|_| unreachable!()));

/// Validate raw query parameters into a [`QueryFilter`].
///
/// Parameters are checked in the order `code`, `method`, `user`; the first
/// failure is reported. An empty value is treated the same as an absent one.
///
/// # Errors
///
/// Returns [`QueryError::InvalidParameter`] naming the offending parameter.
pub fn validate(params: &QueryParams) -> Result<QueryFilter> {
    Ok(QueryFilter {
        code: check("code", params.code.as_deref(), &CODE_REGEX)?,
        method: check("method", params.method.as_deref(), &METHOD_REGEX)?,
        user: check("user", params.user.as_deref(), &USER_REGEX)?,
    })
}

fn check(name: &'static str, value: Option<&str>, pattern: &Regex) -> Result<Option<String>> {
    match value {
        None | Some("") => Ok(None),
        Some(v) if pattern.is_match(v) => Ok(Some(v.to_string())),
        Some(_) => Err(QueryError::InvalidParameter(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(code: Option<&str>, method: Option<&str>, user: Option<&str>) -> QueryParams {
        QueryParams {
            code: code.map(str::to_string),
            method: method.map(str::to_string),
            user: user.map(str::to_string),
        }
    }

    #[test]
    fn test_all_absent_is_empty_filter() {
        let filter = validate(&QueryParams::default()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_valid_params() {
        let filter = validate(&params(Some("200"), Some("POST"), Some("abc_def"))).unwrap();
        assert_eq!(filter.code(), Some("200"));
        assert_eq!(filter.method(), Some("POST"));
        assert_eq!(filter.user(), Some("abc_def"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let filter = validate(&params(Some(""), Some(""), Some(""))).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_code_rejects_non_digits() {
        for bad in ["abc", "20a", "-200", "2 00", "200\n", "٢٠٠", "+1"] {
            let err = validate(&params(Some(bad), None, None)).unwrap_err();
            assert_eq!(err, QueryError::InvalidParameter("code"), "input {bad:?}");
        }
    }

    #[test]
    fn test_method_rejects_digits_and_symbols() {
        for bad in ["123!", "GET1", "PO-ST", "GET ", "_GET", "GÉT"] {
            let err = validate(&params(None, Some(bad), None)).unwrap_err();
            assert_eq!(err, QueryError::InvalidParameter("method"), "input {bad:?}");
        }
    }

    #[test]
    fn test_user_allows_underscore_only_extra() {
        assert!(validate(&params(None, None, Some("_"))).is_ok());
        assert!(validate(&params(None, None, Some("frank_the_tank"))).is_ok());
        for bad in ["admin!123", "bob1", "a-b", "a.b", "bob smith"] {
            let err = validate(&params(None, None, Some(bad))).unwrap_err();
            assert_eq!(err, QueryError::InvalidParameter("user"), "input {bad:?}");
        }
    }

    #[test]
    fn test_first_invalid_param_reported() {
        let err = validate(&params(Some("abc"), Some("1"), Some("2"))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for 'code' query parameter");

        let err = validate(&params(Some("200"), Some("1"), Some("2"))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for 'method' query parameter");
    }
}
