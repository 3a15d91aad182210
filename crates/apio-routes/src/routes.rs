//! The request functions of one resource.

use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use apio_core::{ApioError, ApioResult, BinaryFunction, BinaryStream, ResourceType, Try};
use indexmap::IndexMap;

use crate::filter::{Filter, FilterParams};
use crate::identifier::parse_identifier;
use crate::pagination::{Page, PageItems, Pagination, SingleModel};

/// Fetches one model from the raw identifier segment of a path.
pub type SingleModelFunction<T> = Arc<dyn Fn(&str) -> Try<SingleModel<T>> + Send + Sync>;

/// Fetches a page of the unfiltered collection.
pub type PageFunction<T> = Arc<dyn Fn(Pagination) -> Try<Page<T>> + Send + Sync>;

/// Fetches a page of the collection narrowed by a filter.
pub type FilteredPageFunction<T> =
    Arc<dyn Fn(&FilterParams, Pagination) -> Try<Page<T>> + Send + Sync>;

/// The request functions registered for models of type `T`.
///
/// Every slot is optional. A request for an empty slot is answered by the
/// dispatcher with "not found".
pub struct Routes<T> {
    identifier_type: Option<ResourceType>,
    single_model_function: Option<SingleModelFunction<T>>,
    page_function: Option<PageFunction<T>>,
    filtered_page_functions: IndexMap<String, FilteredPageFunction<T>>,
    binary_functions: IndexMap<String, BinaryFunction<T>>,
}

impl<T: 'static> Routes<T> {
    /// Returns a builder.
    pub fn builder() -> RoutesBuilder<T> {
        RoutesBuilder::new()
    }
}

impl<T> Routes<T> {
    /// Returns the identifier type the single model function parses, if one
    /// is registered.
    #[must_use]
    pub const fn identifier_type(&self) -> Option<ResourceType> {
        self.identifier_type
    }

    /// Returns the single model function.
    #[must_use]
    pub const fn single_model_function(&self) -> Option<&SingleModelFunction<T>> {
        self.single_model_function.as_ref()
    }

    /// Returns the unfiltered page function.
    #[must_use]
    pub const fn page_function(&self) -> Option<&PageFunction<T>> {
        self.page_function.as_ref()
    }

    /// Returns the page function registered for the filter `name`.
    #[must_use]
    pub fn filtered_page_function(&self, name: &str) -> Option<&FilteredPageFunction<T>> {
        self.filtered_page_functions.get(name)
    }

    /// Returns every filtered page function, keyed by filter name.
    #[must_use]
    pub const fn filtered_page_functions(&self) -> &IndexMap<String, FilteredPageFunction<T>> {
        &self.filtered_page_functions
    }

    /// Returns the binary function registered under `key`.
    #[must_use]
    pub fn binary_function(&self, key: &str) -> Option<&BinaryFunction<T>> {
        self.binary_functions.get(key)
    }

    /// Returns every binary function, keyed by binary id.
    #[must_use]
    pub const fn binary_functions(&self) -> &IndexMap<String, BinaryFunction<T>> {
        &self.binary_functions
    }

    /// Returns `true` if no slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.single_model_function.is_none()
            && self.page_function.is_none()
            && self.filtered_page_functions.is_empty()
            && self.binary_functions.is_empty()
    }
}

impl<T> Clone for Routes<T> {
    fn clone(&self) -> Self {
        Self {
            identifier_type: self.identifier_type,
            single_model_function: self.single_model_function.clone(),
            page_function: self.page_function.clone(),
            filtered_page_functions: self.filtered_page_functions.clone(),
            binary_functions: self.binary_functions.clone(),
        }
    }
}

impl<T> fmt::Debug for Routes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routes")
            .field("identifier_type", &self.identifier_type)
            .field("single_model", &self.single_model_function.is_some())
            .field("page", &self.page_function.is_some())
            .field(
                "filters",
                &self.filtered_page_functions.keys().collect::<Vec<_>>(),
            )
            .field("binaries", &self.binary_functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Routes`].
///
/// Author functions return `Result<_, ApioError>`. The builder wraps each one
/// so that identifier and filter parsing happen first and a panic inside the
/// function surfaces as a server error.
///
/// # Example
///
/// ```
/// use apio_routes::{PageItems, Pagination, Routes};
///
/// struct Folder { id: i64 }
///
/// let routes = Routes::<Folder>::builder()
///     .collection_item(|id: i64| Ok(Folder { id }))
///     .collection_page(|_: Pagination| {
///         let items = (1..=3).map(|id| Folder { id }).collect();
///         Ok(PageItems::new(items, 3))
///     })
///     .build();
///
/// let single = routes.single_model_function().unwrap();
/// assert_eq!(single("7").get_unchecked().model().id, 7);
/// assert!(single("seven").is_failure());
///
/// let page = routes.page_function().unwrap()(Pagination::default());
/// assert_eq!(page.get_unchecked().len(), 3);
/// ```
#[must_use]
pub struct RoutesBuilder<T> {
    routes: Routes<T>,
}

impl<T: 'static> RoutesBuilder<T> {
    /// Creates a builder with every slot empty.
    pub fn new() -> Self {
        Self {
            routes: Routes {
                identifier_type: None,
                single_model_function: None,
                page_function: None,
                filtered_page_functions: IndexMap::new(),
                binary_functions: IndexMap::new(),
            },
        }
    }

    /// Registers the single model function, parsing identifiers with `I`'s
    /// `FromStr` implementation.
    pub fn collection_item<I, F>(self, function: F) -> Self
    where
        I: FromStr + 'static,
        I::Err: Display,
        F: Fn(I) -> ApioResult<T> + Send + Sync + 'static,
    {
        self.collection_item_with(parse_identifier::<I>, function)
    }

    /// Registers the single model function with a custom identifier parser.
    pub fn collection_item_with<I, P, F>(mut self, parser: P, function: F) -> Self
    where
        I: 'static,
        P: Fn(&str) -> ApioResult<I> + Send + Sync + 'static,
        F: Fn(I) -> ApioResult<T> + Send + Sync + 'static,
    {
        self.routes.identifier_type = Some(ResourceType::of::<I>());
        self.routes.single_model_function = Some(Arc::new(move |raw: &str| {
            Try::from_fallible(|| parser(raw).and_then(&function)).map(SingleModel::new)
        }));
        self
    }

    /// Registers the unfiltered page function.
    pub fn collection_page<F>(mut self, function: F) -> Self
    where
        F: Fn(Pagination) -> ApioResult<PageItems<T>> + Send + Sync + 'static,
    {
        self.routes.page_function = Some(Arc::new(move |pagination: Pagination| {
            Try::from_fallible(|| function(pagination)).map(|items| Page::new(items, pagination))
        }));
        self
    }

    /// Registers the page function for filter `F`, replacing any earlier
    /// registration for the same filter.
    pub fn filtered_collection_page<F, G>(mut self, function: G) -> Self
    where
        F: Filter,
        G: Fn(F, Pagination) -> ApioResult<PageItems<T>> + Send + Sync + 'static,
    {
        let function: FilteredPageFunction<T> =
            Arc::new(move |params: &FilterParams, pagination: Pagination| {
                Try::from_fallible(|| {
                    F::from_params(params).and_then(|filter| function(filter, pagination))
                })
                .map(|items| Page::new(items, pagination))
            });
        self.routes
            .filtered_page_functions
            .insert(F::NAME.to_string(), function);
        self
    }

    /// Registers a binary function under `key`.
    pub fn binary<F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        F: Fn(&T) -> Result<BinaryStream, ApioError> + Send + Sync + 'static,
    {
        self.routes
            .binary_functions
            .insert(key.into(), Arc::new(function));
        self
    }

    /// Registers several binary functions at once, such as those declared on
    /// a representor.
    pub fn binaries<'a>(
        mut self,
        functions: impl IntoIterator<Item = (&'a String, &'a BinaryFunction<T>)>,
    ) -> Self {
        self.routes.binary_functions.extend(
            functions
                .into_iter()
                .map(|(key, function)| (key.clone(), Arc::clone(function))),
        );
        self
    }

    /// Builds the routes. No slot is required.
    pub fn build(self) -> Routes<T> {
        tracing::trace!(
            model_type = std::any::type_name::<T>(),
            routes = ?self.routes,
            "Built routes"
        );
        self.routes
    }
}

impl<T: 'static> Default for RoutesBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RoutesBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutesBuilder")
            .field("routes", &self.routes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apio_core::ErrorCategory;
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Document {
        id: i64,
        folder_id: i64,
    }

    struct FolderIdFilter {
        folder_id: i64,
    }

    impl Filter for FolderIdFilter {
        const NAME: &'static str = "folderId";

        fn from_params(params: &FilterParams) -> ApioResult<Self> {
            Ok(Self {
                folder_id: params.parse("folderId")?,
            })
        }
    }

    fn documents() -> Vec<Document> {
        (1..=5)
            .map(|id| Document {
                id,
                folder_id: id % 2,
            })
            .collect()
    }

    #[test]
    fn test_empty_routes() {
        let routes = Routes::<Document>::builder().build();

        assert!(routes.is_empty());
        assert!(routes.single_model_function().is_none());
        assert!(routes.page_function().is_none());
        assert!(routes.identifier_type().is_none());
    }

    #[test]
    fn test_collection_item_parses_identifier() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let routes = Routes::builder()
            .collection_item(move |id: i64| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Document { id, folder_id: 0 })
            })
            .build();

        assert_eq!(routes.identifier_type(), Some(ResourceType::of::<i64>()));
        let single = routes.single_model_function().unwrap();

        let found = single("3").get_unchecked();
        assert_eq!(found.model().id, 3);

        let error = single("three").into_failure().unwrap();
        assert!(error.is(ErrorCategory::BadRequest));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_collection_item_propagates_author_error() {
        let routes = Routes::<Document>::builder()
            .collection_item(|id: i64| Err(ApioError::not_found_resource("Document", id.to_string())))
            .build();

        let error = routes.single_model_function().unwrap()("9")
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::NotFound));
        assert!(error.to_string().contains("'9'"));
    }

    #[test]
    fn test_collection_item_panic_is_server_error() {
        let routes = Routes::<Document>::builder()
            .collection_item(|_: i64| -> ApioResult<Document> { panic!("data store exploded") })
            .build();

        let error = routes.single_model_function().unwrap()("1")
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::ServerError));
    }

    #[test]
    fn test_collection_item_with_custom_parser() {
        let routes = Routes::<Document>::builder()
            .collection_item_with(
                |raw: &str| {
                    raw.strip_prefix("doc-")
                        .and_then(|id| id.parse::<i64>().ok())
                        .ok_or_else(|| ApioError::invalid_parameter("id", "expected doc-<n>"))
                },
                |id| Ok(Document { id, folder_id: 0 }),
            )
            .build();

        let single = routes.single_model_function().unwrap();
        assert_eq!(single("doc-4").get_unchecked().model().id, 4);
        assert!(single("4").is_failure());
    }

    #[test]
    fn test_collection_page_passes_pagination_through() {
        let routes = Routes::<Document>::builder()
            .collection_page(|pagination: Pagination| {
                let all = documents();
                let items = all
                    .iter()
                    .skip(pagination.start_position())
                    .take(pagination.items_per_page() as usize)
                    .cloned()
                    .collect();
                Ok(PageItems::new(items, all.len()))
            })
            .build();

        let page = routes.page_function().unwrap()(Pagination::new(2, 2)).get_unchecked();
        assert_eq!(
            page.items().iter().map(|d| d.id).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert_eq!(page.pagination(), Pagination::new(2, 2));
        assert_eq!(page.total_count(), 5);
    }

    #[test]
    fn test_filtered_page_by_filter_name() {
        let routes = Routes::<Document>::builder()
            .filtered_collection_page(|filter: FolderIdFilter, _pagination| {
                let items: Vec<Document> = documents()
                    .into_iter()
                    .filter(|d| d.folder_id == filter.folder_id)
                    .collect();
                let count = items.len();
                Ok(PageItems::new(items, count))
            })
            .build();

        let function = routes.filtered_page_function("folderId").unwrap();
        let params = FilterParams::new().with("folderId", "1");
        let page = function(&params, Pagination::default()).get_unchecked();
        assert_eq!(page.len(), 3);

        let error = function(&FilterParams::new(), Pagination::default())
            .into_failure()
            .unwrap();
        assert!(error.is(ErrorCategory::BadRequest));
        assert!(routes.filtered_page_function("other").is_none());
    }

    #[test]
    fn test_filtered_page_reregistration_overwrites() {
        let routes = Routes::<Document>::builder()
            .filtered_collection_page(|_: FolderIdFilter, _| Ok(PageItems::new(Vec::new(), 0)))
            .filtered_collection_page(|_: FolderIdFilter, _| Ok(PageItems::new(documents(), 5)))
            .build();

        assert_eq!(routes.filtered_page_functions().len(), 1);
        let page = routes.filtered_page_function("folderId").unwrap()(
            &FilterParams::new().with("folderId", "0"),
            Pagination::default(),
        );
        assert_eq!(page.get_unchecked().total_count(), 5);
    }

    #[test]
    fn test_binaries_are_keyed() {
        let mut declared: IndexMap<String, BinaryFunction<Document>> = IndexMap::new();
        declared.insert(
            "content".to_string(),
            Arc::new(|d: &Document| {
                let byte = u8::try_from(d.id).unwrap_or(u8::MAX);
                Ok::<_, ApioError>(Box::new(Cursor::new(vec![byte])) as BinaryStream)
            }),
        );

        let routes = Routes::<Document>::builder()
            .binaries(&declared)
            .binary("thumbnail", |_: &Document| {
                Ok(Box::new(Cursor::new(b"png".to_vec())) as BinaryStream)
            })
            .build();

        let keys: Vec<&String> = routes.binary_functions().keys().collect();
        assert_eq!(keys, vec!["content", "thumbnail"]);

        let mut stream = routes.binary_function("content").unwrap()(&Document {
            id: 7,
            folder_id: 0,
        })
        .unwrap();
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, vec![7]);
    }
}
