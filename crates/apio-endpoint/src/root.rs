//! The root dispatcher.
//!
//! [`RootEndpoint`] answers the four kinds of resource request: a single
//! item, a collection page, a filtered collection page and a binary stream.
//! Each request resolves the `Routes<T>` registered at the path, selects the
//! slot it needs and invokes it. A missing path, a path serving another model
//! type and an empty slot all end as the same "not found" failure; every
//! other failure comes from the invoked function and passes through as is.

use std::sync::Arc;
use std::time::Instant;

use apio_core::{ApioError, BinaryStream, ErrorCategory, Try};
use apio_routes::{FilterParams, Page, Pagination, Routes, SingleModel};
use apio_telemetry::metrics::record_dispatch;

use crate::resolver::{resolve_routes, RoutesResolver};

/// Builds the failure for a request nothing is registered to answer.
#[must_use]
pub fn no_endpoint(path: &str) -> ApioError {
    ApioError::not_found(format!("No endpoint found at path {path}"))
}

/// Dispatches resource requests to the routes a resolver provides.
///
/// The endpoint holds no per-request state and can be shared across threads.
///
/// # Example
///
/// ```
/// use apio_core::ErrorCategory;
/// use apio_endpoint::{RootEndpoint, RoutesTable};
/// use apio_routes::{PageItems, Pagination, Routes};
///
/// struct Folder { id: i64 }
///
/// let table = RoutesTable::new().with(
///     "folders",
///     Routes::<Folder>::builder()
///         .collection_page(|_| Ok(PageItems::new(vec![Folder { id: 1 }], 1)))
///         .build(),
/// );
/// let endpoint = RootEndpoint::new(table);
///
/// let page = endpoint.collection_page::<Folder>("folders", Pagination::default());
/// assert_eq!(page.get_unchecked().items()[0].id, 1);
///
/// let item = endpoint.collection_item_single_model::<Folder>("folders", "1");
/// assert!(item.error().is_some_and(|e| e.is(ErrorCategory::NotFound)));
/// ```
#[derive(Debug, Clone)]
pub struct RootEndpoint<R> {
    resolver: R,
}

impl<R: RoutesResolver> RootEndpoint<R> {
    /// Creates an endpoint over `resolver`.
    pub const fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Returns the resolver.
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolves the routes for model type `T` at `path`.
    pub fn routes<T: 'static>(&self, path: &str) -> Try<Arc<Routes<T>>> {
        Try::from_optional(resolve_routes::<T>(&self.resolver, path), "routes")
            .map_fail_matching(ErrorCategory::NoSuchElement, || no_endpoint(path))
    }

    /// Fetches the item identified by `id` from the collection at `path`.
    pub fn collection_item_single_model<T: 'static>(
        &self,
        path: &str,
        id: &str,
    ) -> Try<SingleModel<T>> {
        let started = Instant::now();
        let result = self.single_model::<T>(path, id);
        observe("collection_item", path, &result, started);
        result
    }

    /// Fetches a page of the collection at `path`.
    pub fn collection_page<T: 'static>(&self, path: &str, pagination: Pagination) -> Try<Page<T>> {
        let started = Instant::now();
        let result = self
            .routes::<T>(path)
            .flat_map(|routes| Try::from_optional(routes.page_function().cloned(), "page"))
            .map_fail_matching(ErrorCategory::NoSuchElement, || no_endpoint(path))
            .flat_map(|function| function(pagination));
        observe("collection_page", path, &result, started);
        result
    }

    /// Fetches a page of the collection at `path` narrowed by the filter
    /// named `filter_name`, built from `params`.
    pub fn filtered_collection_page<T: 'static>(
        &self,
        path: &str,
        filter_name: &str,
        params: &FilterParams,
        pagination: Pagination,
    ) -> Try<Page<T>> {
        let started = Instant::now();
        let result = self
            .routes::<T>(path)
            .flat_map(|routes| {
                Try::from_optional(
                    routes.filtered_page_function(filter_name).cloned(),
                    filter_name,
                )
            })
            .map_fail_matching(ErrorCategory::NoSuchElement, || no_endpoint(path))
            .flat_map(|function| function(params, pagination));
        observe("filtered_collection_page", path, &result, started);
        result
    }

    /// Fetches the item identified by `id`, then its binary `binary_id`.
    ///
    /// If the item cannot be fetched that failure is returned and no binary
    /// function runs.
    pub fn collection_item_binary<T: 'static>(
        &self,
        path: &str,
        id: &str,
        binary_id: &str,
    ) -> Try<BinaryStream> {
        let started = Instant::now();
        let result = self
            .single_model::<T>(path, id)
            .map(SingleModel::into_model)
            .flat_map(|model| self.binary::<T>(path, &model, binary_id));
        observe("collection_item_binary", path, &result, started);
        result
    }

    /// Extracts the binary `binary_id` of an already fetched `model`.
    pub fn binary_for_model<T: 'static>(
        &self,
        path: &str,
        model: &T,
        binary_id: &str,
    ) -> Try<BinaryStream> {
        let started = Instant::now();
        let result = self.binary(path, model, binary_id);
        observe("binary_for_model", path, &result, started);
        result
    }

    fn single_model<T: 'static>(&self, path: &str, id: &str) -> Try<SingleModel<T>> {
        self.routes::<T>(path)
            .flat_map(|routes| {
                Try::from_optional(routes.single_model_function().cloned(), "single model")
            })
            .map_fail_matching(ErrorCategory::NoSuchElement, || no_endpoint(path))
            .flat_map(|function| function(id))
    }

    fn binary<T: 'static>(&self, path: &str, model: &T, binary_id: &str) -> Try<BinaryStream> {
        self.routes::<T>(path)
            .flat_map(|routes| {
                Try::from_optional(routes.binary_function(binary_id).cloned(), binary_id)
            })
            .map_fail_matching(ErrorCategory::NoSuchElement, || {
                no_endpoint(&format!("{path}/{binary_id}"))
            })
            .flat_map(|function| Try::from_fallible(|| function(model)))
    }
}

fn observe<V>(operation: &'static str, path: &str, result: &Try<V>, started: Instant) {
    let elapsed = started.elapsed();
    match result.error() {
        None => {
            tracing::debug!(operation, path, ?elapsed, "Dispatched");
            record_dispatch(operation, "success", elapsed);
        }
        Some(error) => {
            let category = error.category();
            if category == ErrorCategory::ServerError {
                tracing::warn!(operation, path, error = %error, "Dispatch failed");
            } else {
                tracing::debug!(
                    operation,
                    path,
                    error_category = category.as_str(),
                    "Dispatch rejected"
                );
            }
            record_dispatch(operation, category.as_str(), elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::RoutesTable;
    use apio_routes::PageItems;
    use std::io::Cursor;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: u32,
        name: String,
    }

    struct Animal;

    fn people() -> RoutesTable {
        RoutesTable::new().with(
            "people",
            Routes::<Person>::builder()
                .collection_item(|id: u32| {
                    if id == 0 {
                        Err(ApioError::not_found_resource("Person", "0"))
                    } else {
                        Ok(Person {
                            id,
                            name: format!("person-{id}"),
                        })
                    }
                })
                .binary("avatar", |p: &Person| {
                    Ok(Box::new(Cursor::new(p.name.clone().into_bytes())) as BinaryStream)
                })
                .build(),
        )
    }

    #[test]
    fn test_routes_not_registered() {
        let endpoint = RootEndpoint::new(RoutesTable::new());

        let error = endpoint
            .collection_item_single_model::<Person>("people", "1")
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::NotFound));
        assert_eq!(error.to_string(), "Not found: No endpoint found at path people");
    }

    #[test]
    fn test_routes_for_other_model_type() {
        let endpoint = RootEndpoint::new(people());

        let error = endpoint
            .collection_item_single_model::<Animal>("people", "1")
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::NotFound));
    }

    #[test]
    fn test_single_model_success() {
        let endpoint = RootEndpoint::new(people());

        let person = endpoint
            .collection_item_single_model::<Person>("people", "4")
            .get_unchecked();
        assert_eq!(person.model().name, "person-4");
    }

    #[test]
    fn test_author_errors_pass_through() {
        let endpoint = RootEndpoint::new(people());

        let missing = endpoint
            .collection_item_single_model::<Person>("people", "0")
            .into_failure()
            .unwrap();
        assert!(missing.to_string().contains("Person with ID '0'"));

        let malformed = endpoint
            .collection_item_single_model::<Person>("people", "abc")
            .into_failure()
            .unwrap();
        assert!(malformed.is(ErrorCategory::BadRequest));
    }

    #[test]
    fn test_missing_page_slot() {
        let endpoint = RootEndpoint::new(people());

        let error = endpoint
            .collection_page::<Person>("people", Pagination::default())
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::NotFound));

        let error = endpoint
            .filtered_collection_page::<Person>(
                "people",
                "name",
                &FilterParams::new(),
                Pagination::default(),
            )
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::NotFound));
    }

    #[test]
    fn test_binary_for_model() {
        let endpoint = RootEndpoint::new(people());
        let person = Person {
            id: 9,
            name: "ada".to_string(),
        };

        let mut content = String::new();
        let mut stream = endpoint
            .binary_for_model("people", &person, "avatar")
            .get_unchecked();
        std::io::Read::read_to_string(&mut stream, &mut content).unwrap();
        assert_eq!(content, "ada");

        let error = endpoint
            .binary_for_model("people", &person, "banner")
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::NotFound));
        assert!(error.to_string().contains("people/banner"));
    }

    #[test]
    fn test_items_page_empty_routes() {
        let endpoint = RootEndpoint::new(RoutesTable::new().with(
            "empty",
            Routes::<Person>::builder().build(),
        ));

        assert!(endpoint
            .collection_item_single_model::<Person>("empty", "1")
            .is_failure());
        assert!(endpoint
            .collection_page::<Person>("empty", Pagination::default())
            .is_failure());
        assert!(endpoint
            .collection_item_binary::<Person>("empty", "1", "avatar")
            .is_failure());
    }

    #[test]
    fn test_page_slot_without_item_slot() {
        let endpoint = RootEndpoint::new(RoutesTable::new().with(
            "pages",
            Routes::<Person>::builder()
                .collection_page(|_| Ok(PageItems::new(Vec::new(), 0)))
                .build(),
        ));

        assert!(endpoint
            .collection_page::<Person>("pages", Pagination::default())
            .is_success());
        let error = endpoint
            .collection_item_single_model::<Person>("pages", "1")
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::NotFound));
    }
}
