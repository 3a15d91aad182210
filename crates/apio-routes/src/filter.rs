//! Query parameters and typed collection filters.
//!
//! Raw query values arrive as [`FilterParams`]. A [`Filter`] turns them into a
//! typed value that a filtered page function receives, so that authors never
//! parse strings themselves.

use std::fmt::Display;
use std::str::FromStr;

use apio_core::{ApioError, ApioResult};
use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Raw query parameters of a collection request.
///
/// Most requests carry only a handful of parameters, so they are kept in a
/// small vector of `(name, value)` pairs. Lookups return the first value for
/// a name.
///
/// # Example
///
/// ```
/// use apio_routes::FilterParams;
///
/// let params: FilterParams = [("folderId", "42"), ("page", "2")].into_iter().collect();
///
/// assert_eq!(params.get("folderId"), Some("42"));
/// assert_eq!(params.parse::<i64>("folderId").unwrap(), 42);
/// assert!(params.parse::<i64>("missing").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl FilterParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Adds a parameter, consuming and returning the set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.inner
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parses the required parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns a bad request error if the parameter is missing or does not
    /// parse as a `V`.
    pub fn parse<V>(&self, name: &str) -> ApioResult<V>
    where
        V: FromStr,
        V::Err: Display,
    {
        self.parse_optional(name)?
            .ok_or_else(|| ApioError::invalid_parameter(name, "parameter is required"))
    }

    /// Parses the parameter `name` if present.
    ///
    /// # Errors
    ///
    /// Returns a bad request error if the parameter is present but does not
    /// parse as a `V`.
    pub fn parse_optional<V>(&self, name: &str) -> ApioResult<Option<V>>
    where
        V: FromStr,
        V::Err: Display,
    {
        self.get(name)
            .map(|raw| {
                raw.parse::<V>()
                    .map_err(|e| ApioError::invalid_parameter(name, e.to_string()))
            })
            .transpose()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A typed filter for a collection.
///
/// Each filter type names itself; a resource registers at most one filtered
/// page function per name.
///
/// # Example
///
/// ```
/// use apio_core::ApioResult;
/// use apio_routes::{Filter, FilterParams};
///
/// struct FolderIdFilter { folder_id: i64 }
///
/// impl Filter for FolderIdFilter {
///     const NAME: &'static str = "folderId";
///
///     fn from_params(params: &FilterParams) -> ApioResult<Self> {
///         Ok(Self { folder_id: params.parse("folderId")? })
///     }
/// }
///
/// let params = FilterParams::new().with("folderId", "7");
/// assert_eq!(FolderIdFilter::from_params(&params).unwrap().folder_id, 7);
/// ```
pub trait Filter: Sized + 'static {
    /// The name requests use to select this filter.
    const NAME: &'static str;

    /// Builds the filter from query parameters.
    ///
    /// # Errors
    ///
    /// Returns a bad request error when the parameters are missing or
    /// malformed.
    fn from_params(params: &FilterParams) -> ApioResult<Self>;
}
