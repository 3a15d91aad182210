//! Pagination and the artifacts page and item functions produce.

use apio_core::{ApioError, ApioResult, ResourceType};
use serde::{Deserialize, Serialize};

use crate::filter::FilterParams;

/// Query parameter carrying the page size.
pub const ITEMS_PER_PAGE_PARAM: &str = "per_page";

/// Query parameter carrying the 1-based page number.
pub const PAGE_NUMBER_PARAM: &str = "page";

/// Defaults applied when a request omits its pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationDefaults {
    /// Page size used when the request does not set one.
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,

    /// Upper bound on requested page sizes; larger requests are clamped.
    #[serde(default = "default_max_items_per_page")]
    pub max_items_per_page: u32,
}

const fn default_items_per_page() -> u32 {
    30
}

const fn default_max_items_per_page() -> u32 {
    100
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
            max_items_per_page: default_max_items_per_page(),
        }
    }
}

/// The page a collection request asks for.
///
/// Page numbers start at 1. The value is handed to page functions as is.
///
/// # Example
///
/// ```
/// use apio_routes::Pagination;
///
/// let pagination = Pagination::new(10, 3);
/// assert_eq!(pagination.start_position(), 20);
/// assert_eq!(pagination.end_position(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    items_per_page: u32,
    page_number: u32,
}

impl Pagination {
    /// Creates a pagination. Zero values are raised to 1.
    #[must_use]
    pub fn new(items_per_page: u32, page_number: u32) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
            page_number: page_number.max(1),
        }
    }

    /// Reads `per_page` and `page` from query parameters.
    ///
    /// Missing values fall back to `defaults`; page sizes above the
    /// configured maximum are clamped.
    ///
    /// # Errors
    ///
    /// Returns a bad request error if a value is not a positive integer.
    pub fn from_params(params: &FilterParams, defaults: &PaginationDefaults) -> ApioResult<Self> {
        let items_per_page = params
            .parse_optional::<u32>(ITEMS_PER_PAGE_PARAM)?
            .unwrap_or(defaults.items_per_page);
        let page_number = params.parse_optional::<u32>(PAGE_NUMBER_PARAM)?.unwrap_or(1);

        if items_per_page == 0 {
            return Err(ApioError::invalid_parameter(
                ITEMS_PER_PAGE_PARAM,
                "must be greater than zero",
            ));
        }
        if page_number == 0 {
            return Err(ApioError::invalid_parameter(
                PAGE_NUMBER_PARAM,
                "pages are numbered from 1",
            ));
        }

        Ok(Self {
            items_per_page: items_per_page.min(defaults.max_items_per_page.max(1)),
            page_number,
        })
    }

    /// Returns the page size.
    #[must_use]
    pub const fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Returns the offset of the first item on the page.
    #[must_use]
    pub fn start_position(&self) -> usize {
        (self.page_number as usize - 1) * self.items_per_page as usize
    }

    /// Returns the offset one past the last item on the page.
    #[must_use]
    pub fn end_position(&self) -> usize {
        self.page_number as usize * self.items_per_page as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(default_items_per_page(), 1)
    }
}

/// The items of one page together with the size of the whole collection.
///
/// This is what page functions return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageItems<T> {
    items: Vec<T>,
    total_count: usize,
}

impl<T> PageItems<T> {
    /// Creates page items.
    #[must_use]
    pub fn new(items: Vec<T>, total_count: usize) -> Self {
        Self { items, total_count }
    }

    /// Returns the items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the number of items in the whole collection.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }
}

/// A page of a collection, as returned by the dispatcher.
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    total_count: usize,
    pagination: Pagination,
    model_type: ResourceType,
}

impl<T: 'static> Page<T> {
    /// Combines page items with the pagination that produced them.
    #[must_use]
    pub fn new(page_items: PageItems<T>, pagination: Pagination) -> Self {
        Self {
            items: page_items.items,
            total_count: page_items.total_count,
            pagination,
            model_type: ResourceType::of::<T>(),
        }
    }
}

impl<T> Page<T> {
    /// Returns the items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Takes the items out of the page.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in the whole collection.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    /// Returns the pagination this page was fetched with.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Returns the type of the page's models.
    #[must_use]
    pub const fn model_type(&self) -> ResourceType {
        self.model_type
    }

    /// Returns the number of the last page; an empty collection has one page.
    #[must_use]
    pub fn last_page_number(&self) -> usize {
        let per_page = self.pagination.items_per_page() as usize;
        self.total_count.div_ceil(per_page).max(1)
    }

    /// Returns `true` if a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        (self.pagination.page_number() as usize) < self.last_page_number()
    }

    /// Returns `true` if an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.pagination.page_number() > 1
    }
}

/// One model, as returned by the dispatcher.
#[derive(Debug, Clone)]
pub struct SingleModel<T> {
    model: T,
    model_type: ResourceType,
}

impl<T: 'static> SingleModel<T> {
    /// Wraps a model.
    #[must_use]
    pub fn new(model: T) -> Self {
        Self {
            model,
            model_type: ResourceType::of::<T>(),
        }
    }
}

impl<T> SingleModel<T> {
    /// Returns the model.
    #[must_use]
    pub const fn model(&self) -> &T {
        &self.model
    }

    /// Takes the model out.
    #[must_use]
    pub fn into_model(self) -> T {
        self.model
    }

    /// Returns the model's type.
    #[must_use]
    pub const fn model_type(&self) -> ResourceType {
        self.model_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apio_core::ErrorCategory;
    use proptest::prelude::*;

    #[test]
    fn test_positions() {
        let first = Pagination::new(30, 1);
        assert_eq!(first.start_position(), 0);
        assert_eq!(first.end_position(), 30);

        let third = Pagination::new(5, 3);
        assert_eq!(third.start_position(), 10);
        assert_eq!(third.end_position(), 15);
    }

    #[test]
    fn test_new_raises_zero() {
        let pagination = Pagination::new(0, 0);
        assert_eq!(pagination.items_per_page(), 1);
        assert_eq!(pagination.page_number(), 1);
    }

    #[test]
    fn test_from_params_defaults() {
        let pagination =
            Pagination::from_params(&FilterParams::new(), &PaginationDefaults::default()).unwrap();

        assert_eq!(pagination, Pagination::new(30, 1));
    }

    #[test]
    fn test_from_params_clamps_page_size() {
        let params = FilterParams::new().with("per_page", "500").with("page", "2");
        let defaults = PaginationDefaults {
            items_per_page: 10,
            max_items_per_page: 50,
        };

        let pagination = Pagination::from_params(&params, &defaults).unwrap();
        assert_eq!(pagination.items_per_page(), 50);
        assert_eq!(pagination.page_number(), 2);
    }

    #[test]
    fn test_from_params_rejects_invalid() {
        let defaults = PaginationDefaults::default();

        let zero_page = FilterParams::new().with("page", "0");
        let error = Pagination::from_params(&zero_page, &defaults).unwrap_err();
        assert!(error.is(ErrorCategory::BadRequest));

        let negative = FilterParams::new().with("per_page", "-3");
        let error = Pagination::from_params(&negative, &defaults).unwrap_err();
        assert!(error.is(ErrorCategory::BadRequest));
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::new(PageItems::new(vec![1, 2, 3], 23), Pagination::new(10, 2));

        assert_eq!(page.len(), 3);
        assert_eq!(page.total_count(), 23);
        assert_eq!(page.last_page_number(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
        assert!(page.model_type().is::<i32>());
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page: Page<String> = Page::new(PageItems::new(Vec::new(), 0), Pagination::default());

        assert!(page.is_empty());
        assert_eq!(page.last_page_number(), 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_single_model() {
        let single = SingleModel::new("document".to_string());

        assert!(single.model_type().is::<String>());
        assert_eq!(single.into_model(), "document");
    }

    #[test]
    fn test_defaults_deserialize_with_missing_fields() {
        let defaults: PaginationDefaults = serde_json::from_str(r#"{"items_per_page": 5}"#).unwrap();

        assert_eq!(defaults.items_per_page, 5);
        assert_eq!(defaults.max_items_per_page, 100);
    }

    proptest! {
        #[test]
        fn prop_pages_tile_the_collection(per_page in 1_u32..200, page in 1_u32..1000) {
            let current = Pagination::new(per_page, page);
            let next = Pagination::new(per_page, page + 1);

            prop_assert_eq!(current.end_position(), next.start_position());
            prop_assert_eq!(
                current.end_position() - current.start_position(),
                per_page as usize
            );
        }
    }
}
