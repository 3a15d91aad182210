//! The [`Try`] result type.
//!
//! `Try<V>` is either `Success(V)` or `Failure(ApioError)`. Every lookup and
//! extraction in the dispatch path returns one, and the combinators below
//! compose them without letting an author-supplied function unwind through
//! the core: a panic inside a mapping function becomes a
//! [`ServerError`](crate::ApioError::ServerError) failure at the call site.
//!
//! # Example
//!
//! ```
//! use apio_core::{ApioError, ErrorCategory, Try};
//!
//! let lookup: Option<&str> = None;
//!
//! let result = Try::from_optional(lookup, "single model function")
//!     .map_fail_matching(ErrorCategory::NoSuchElement, || {
//!         ApioError::not_found("No endpoint found at path people")
//!     })
//!     .map(str::len);
//!
//! assert!(result.error().is_some_and(|e| e.is(ErrorCategory::NotFound)));
//! ```

use std::panic::{self, AssertUnwindSafe};

use crate::error::{ApioError, ErrorCategory};

/// A value or the error that prevented producing it.
#[derive(Debug)]
#[must_use = "a Try may hold a failure that should be propagated"]
pub enum Try<V> {
    /// The computation produced a value.
    Success(V),
    /// The computation failed.
    Failure(ApioError),
}

/// Runs `f`, turning both `Err` and a panic into a failure.
fn guarded<V>(f: impl FnOnce() -> Result<V, ApioError>) -> Try<V> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Try::Success(value),
        Ok(Err(error)) => Try::Failure(error),
        Err(payload) => Try::Failure(ApioError::from_panic(payload)),
    }
}

impl<V> Try<V> {
    /// Creates a successful `Try`.
    pub const fn success(value: V) -> Self {
        Self::Success(value)
    }

    /// Creates a failed `Try`.
    pub fn failure(error: impl Into<ApioError>) -> Self {
        Self::Failure(error.into())
    }

    /// Runs a fallible computation.
    ///
    /// `Err` values and panics both become [`Try::Failure`].
    pub fn from_fallible<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<V, E>,
        E: Into<ApioError>,
    {
        guarded(|| f().map_err(Into::into))
    }

    /// Converts an optional value, failing with the
    /// [`NoSuchElement`](ErrorCategory::NoSuchElement) signal when absent.
    ///
    /// Callers usually follow this with [`Try::map_fail_matching`] to turn the
    /// generic signal into a domain error.
    pub fn from_optional(value: Option<V>, what: impl Into<String>) -> Self {
        match value {
            Some(value) => Self::Success(value),
            None => Self::Failure(ApioError::no_such_element(what)),
        }
    }

    /// Acquires a resource, runs `body` with it and releases it.
    ///
    /// The resource is dropped on every exit path: after `body` returns, when
    /// it returns an error, and when it panics. A failure to acquire the
    /// resource skips `body` entirely.
    ///
    /// # Example
    ///
    /// ```
    /// use std::io::{BufRead, BufReader, Cursor};
    /// use apio_core::Try;
    ///
    /// let line = Try::from_fallible_with_resources(
    ///     || Ok::<_, std::io::Error>(BufReader::new(Cursor::new("first\nsecond"))),
    ///     |reader| {
    ///         let mut line = String::new();
    ///         reader.read_line(&mut line)?;
    ///         Ok(line.trim_end().to_string())
    ///     },
    /// );
    ///
    /// assert_eq!(line.get_unchecked(), "first");
    /// ```
    pub fn from_fallible_with_resources<R, S, B, E>(supplier: S, body: B) -> Self
    where
        S: FnOnce() -> Result<R, E>,
        B: FnOnce(&mut R) -> Result<V, E>,
        E: Into<ApioError>,
    {
        guarded(|| {
            let mut resource = supplier().map_err(Into::into)?;
            body(&mut resource).map_err(Into::into)
        })
    }

    /// Returns `true` if this is a success.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` if this is a failure.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Applies `f` to the value of a success.
    ///
    /// A panic inside `f` becomes a failure. Failures pass through untouched.
    pub fn map<U, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(V) -> U,
    {
        match self {
            Self::Success(value) => guarded(|| Ok(f(value))),
            Self::Failure(error) => Try::Failure(error),
        }
    }

    /// Applies a fallible `f` to the value of a success.
    ///
    /// An `Err` returned by `f` becomes a failure, as does a panic.
    pub fn try_map<U, E, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(V) -> Result<U, E>,
        E: Into<ApioError>,
    {
        match self {
            Self::Success(value) => guarded(|| f(value).map_err(Into::into)),
            Self::Failure(error) => Try::Failure(error),
        }
    }

    /// Applies `f`, which itself returns a `Try`, and flattens the result.
    pub fn flat_map<U, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(V) -> Try<U>,
    {
        match self {
            Self::Success(value) => guarded(|| f(value).into_result()),
            Self::Failure(error) => Try::Failure(error),
        }
    }

    /// Replaces a failure of the given category with the error built by
    /// `recovery`.
    ///
    /// Successes and failures of any other category pass through unchanged;
    /// `recovery` only runs on a match.
    pub fn map_fail_matching<F>(self, category: ErrorCategory, recovery: F) -> Self
    where
        F: FnOnce() -> ApioError,
    {
        match self {
            Self::Failure(error) if error.is(category) => Self::Failure(recovery()),
            other => other,
        }
    }

    /// Runs `f` on the value of a success, for side effects.
    pub fn inspect<F>(self, f: F) -> Self
    where
        F: FnOnce(&V),
    {
        if let Self::Success(value) = &self {
            f(value);
        }
        self
    }

    /// Returns the value of a success, discarding any failure.
    pub fn ok(self) -> Option<V> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error of a failure.
    pub fn error(&self) -> Option<&ApioError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Consumes the `Try`, returning the error of a failure.
    pub fn into_failure(self) -> Option<ApioError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard `Result` so the caller can use `?`.
    pub fn into_result(self) -> Result<V, ApioError> {
        self.into()
    }

    /// Returns the value, panicking with the failure otherwise.
    ///
    /// Meant for the outermost boundary and for tests; the core never calls it.
    ///
    /// # Panics
    ///
    /// Panics if this is a failure.
    pub fn get_unchecked(self) -> V {
        match self {
            Self::Success(value) => value,
            Self::Failure(error) => panic!("called `Try::get_unchecked` on a failure: {error}"),
        }
    }
}

impl<V, E: Into<ApioError>> From<Result<V, E>> for Try<V> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error.into()),
        }
    }
}

impl<V> From<Try<V>> for Result<V, ApioError> {
    fn from(value: Try<V>) -> Self {
        match value {
            Try::Success(value) => Ok(value),
            Try::Failure(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_map_success() {
        let result = Try::success(21).map(|v| v * 2);
        assert_eq!(result.get_unchecked(), 42);
    }

    #[test]
    fn test_map_panic_becomes_failure() {
        let result: Try<i32> = Try::success(1).map(|_| panic!("extractor exploded"));

        let error = result.into_failure().expect("map should capture the panic");
        assert_eq!(error.category(), ErrorCategory::ServerError);
        assert!(error.to_string().contains("extractor exploded"));
    }

    #[test]
    fn test_map_short_circuits_on_failure() {
        let called = Cell::new(false);
        let result = Try::<i32>::failure(ApioError::bad_request("nope")).map(|v| {
            called.set(true);
            v
        });

        assert!(!called.get());
        assert!(result.error().is_some_and(|e| e.is(ErrorCategory::BadRequest)));
    }

    #[test]
    fn test_try_map_error_becomes_failure() {
        let result = Try::success("x").try_map(|raw| {
            raw.parse::<i64>()
                .map_err(|e| ApioError::invalid_parameter("id", e.to_string()))
        });
        assert!(result.error().is_some_and(|e| e.is(ErrorCategory::BadRequest)));
    }

    #[test]
    fn test_flat_map_flattens() {
        let result = Try::success(2).flat_map(|v| Try::success(v + 1));
        assert_eq!(result.get_unchecked(), 3);

        let result: Try<i32> =
            Try::success(2).flat_map(|_| Try::failure(ApioError::not_found("gone")));
        assert!(result.error().is_some_and(|e| e.is(ErrorCategory::NotFound)));
    }

    #[test]
    fn test_flat_map_panic_becomes_failure() {
        let result: Try<i32> = Try::success(2).flat_map(|_| panic!("nested"));
        assert!(result.is_failure());
    }

    #[test]
    fn test_map_fail_matching_translates_matching_category() {
        let result: Try<i32> = Try::from_optional(None, "page function")
            .map_fail_matching(ErrorCategory::NoSuchElement, || {
                ApioError::not_found("No endpoint found at path people")
            });

        let error = result.into_failure().unwrap();
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert!(error.to_string().contains("people"));
    }

    #[test]
    fn test_map_fail_matching_skips_other_categories() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let result: Try<i32> = Try::failure(ApioError::bad_request("bad id"))
            .map_fail_matching(ErrorCategory::NoSuchElement, move || {
                counter.set(counter.get() + 1);
                ApioError::not_found("unused")
            });

        assert_eq!(calls.get(), 0);
        let error = result.into_failure().unwrap();
        assert_eq!(error.category(), ErrorCategory::BadRequest);
        assert!(error.to_string().contains("bad id"));
    }

    #[test]
    fn test_map_fail_matching_leaves_success() {
        let result = Try::success(5)
            .map_fail_matching(ErrorCategory::NoSuchElement, || unreachable!("not called"));
        assert_eq!(result.get_unchecked(), 5);
    }

    struct Tracked<'a> {
        released: &'a Cell<bool>,
    }

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.released.set(true);
        }
    }

    #[test]
    fn test_resources_released_on_success() {
        let released = Cell::new(false);
        let result = Try::from_fallible_with_resources(
            || Ok::<_, ApioError>(Tracked { released: &released }),
            |_| Ok::<_, ApioError>(7),
        );
        assert_eq!(result.get_unchecked(), 7);
        assert!(released.get());
    }

    #[test]
    fn test_resources_released_on_error() {
        let released = Cell::new(false);
        let result: Try<i32> = Try::from_fallible_with_resources(
            || Ok::<_, ApioError>(Tracked { released: &released }),
            |_| Err(ApioError::server_error("read failed")),
        );
        assert!(result.is_failure());
        assert!(released.get());
    }

    #[test]
    fn test_resources_released_on_panic() {
        let released = Cell::new(false);
        let result: Try<i32> = Try::from_fallible_with_resources(
            || Ok::<_, ApioError>(Tracked { released: &released }),
            |_| panic!("body failed"),
        );
        assert!(result.is_failure());
        assert!(released.get());
    }

    #[test]
    fn test_resource_acquisition_failure_skips_body() {
        let ran = Cell::new(false);
        let result: Try<i32> = Try::from_fallible_with_resources(
            || Err::<Tracked<'_>, _>(ApioError::server_error("no stream")),
            |_| {
                ran.set(true);
                Ok(1)
            },
        );
        assert!(result.is_failure());
        assert!(!ran.get());
    }

    #[test]
    fn test_result_conversions() {
        let ok: Try<i32> = Ok::<_, ApioError>(1).into();
        assert!(ok.is_success());

        let err: Result<i32, ApioError> = Try::<i32>::failure(ApioError::not_found("x")).into();
        assert!(err.is_err());
    }

    #[test]
    #[should_panic(expected = "get_unchecked")]
    fn test_get_unchecked_panics_on_failure() {
        let _ = Try::<i32>::failure(ApioError::not_found("x")).get_unchecked();
    }

    proptest! {
        #[test]
        fn prop_flat_map_of_success_matches_map(value in any::<i32>()) {
            let mapped = Try::success(value).map(|v| i64::from(v) * 2);
            let chained = Try::success(value).flat_map(|v| Try::success(i64::from(v) * 2));

            prop_assert_eq!(mapped.ok(), chained.ok());
        }

        #[test]
        fn prop_failure_is_never_mapped(message in "[a-z]{1,16}") {
            let result = Try::<i32>::failure(ApioError::not_found(message.clone()))
                .map(|v| v + 1)
                .flat_map(|v| Try::success(v * 2));

            let error = result.into_failure();
            prop_assert!(error.is_some());
            prop_assert!(error.map(|e| e.to_string().contains(&message)).unwrap_or(false));
        }
    }
}
