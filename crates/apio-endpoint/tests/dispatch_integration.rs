//! Dispatch through a registry assembled from several resources.

use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use apio_core::{ApioError, ApioResult, BinaryStream, ErrorCategory};
use apio_endpoint::{Resource, ResourceRegistry, RootEndpoint};
use apio_representor::RepresentorBuilder;
use apio_routes::{Filter, FilterParams, PageItems, Pagination, RoutesBuilder};
use metrics_exporter_prometheus::PrometheusBuilder;

#[derive(Debug, Clone, PartialEq)]
struct Folder {
    id: i64,
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Document {
    id: i64,
    folder_id: i64,
    title: String,
}

fn documents() -> Vec<Document> {
    (1..=7)
        .map(|id| Document {
            id,
            folder_id: id % 2,
            title: format!("doc-{id}"),
        })
        .collect()
}

struct FolderFilter {
    folder_id: i64,
}

impl Filter for FolderFilter {
    const NAME: &'static str = "folder";

    fn from_params(params: &FilterParams) -> ApioResult<Self> {
        Ok(Self {
            folder_id: params.parse("folderId")?,
        })
    }
}

struct Folders;

impl Resource for Folders {
    type Model = Folder;
    type Identifier = i64;

    fn path(&self) -> &str {
        "folders"
    }

    fn representor(
        &self,
        builder: RepresentorBuilder<Folder, i64>,
    ) -> RepresentorBuilder<Folder, i64> {
        builder
            .types(["Folder"])
            .identifier(|f: &Folder| f.id)
            .add_string("name", |f: &Folder| f.name.clone())
    }

    fn routes(&self, builder: RoutesBuilder<Folder>) -> RoutesBuilder<Folder> {
        builder.collection_page(|pagination: Pagination| {
            let folders: Vec<Folder> = (0..2)
                .map(|id| Folder {
                    id,
                    name: format!("folder-{id}"),
                })
                .collect();
            let total = folders.len();
            Ok(PageItems::new(
                folders
                    .into_iter()
                    .skip(pagination.start_position())
                    .take(pagination.items_per_page() as usize)
                    .collect(),
                total,
            ))
        })
    }
}

struct Documents {
    downloads: Arc<AtomicUsize>,
}

impl Resource for Documents {
    type Model = Document;
    type Identifier = i64;

    fn path(&self) -> &str {
        "documents"
    }

    fn representor(
        &self,
        builder: RepresentorBuilder<Document, i64>,
    ) -> RepresentorBuilder<Document, i64> {
        let downloads = Arc::clone(&self.downloads);
        builder
            .types(["DigitalDocument"])
            .identifier(|d: &Document| d.id)
            .add_string("title", |d: &Document| d.title.clone())
            .add_bidirectional_model(
                "folder",
                "documents",
                |d: &Document| {
                    Some(Folder {
                        id: d.folder_id,
                        name: format!("folder-{}", d.folder_id),
                    })
                },
                |f: &Folder| f.id,
            )
            .add_binary("content", move |d: &Document| {
                downloads.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(Cursor::new(d.title.clone().into_bytes())) as BinaryStream)
            })
    }

    fn routes(&self, builder: RoutesBuilder<Document>) -> RoutesBuilder<Document> {
        builder
            .collection_item(|id: i64| {
                documents()
                    .into_iter()
                    .find(|d| d.id == id)
                    .ok_or_else(|| ApioError::not_found_resource("Document", id.to_string()))
            })
            .filtered_collection_page(|filter: FolderFilter, pagination: Pagination| {
                let matching: Vec<Document> = documents()
                    .into_iter()
                    .filter(|d| d.folder_id == filter.folder_id)
                    .collect();
                let total = matching.len();
                Ok(PageItems::new(
                    matching
                        .into_iter()
                        .skip(pagination.start_position())
                        .take(pagination.items_per_page() as usize)
                        .collect(),
                    total,
                ))
            })
    }
}

fn endpoint() -> (RootEndpoint<ResourceRegistry>, Arc<AtomicUsize>) {
    let downloads = Arc::new(AtomicUsize::new(0));
    let registry = ResourceRegistry::builder()
        .resource(Folders)
        .resource(Documents {
            downloads: Arc::clone(&downloads),
        })
        .build()
        .unwrap();
    (RootEndpoint::new(registry), downloads)
}

#[test]
fn test_item_and_page_slots_are_independent() {
    let (endpoint, _) = endpoint();

    let page = endpoint.collection_page::<Folder>("folders", Pagination::default());
    assert_eq!(page.get_unchecked().total_count(), 2);

    let item = endpoint
        .collection_item_single_model::<Folder>("folders", "0")
        .into_failure()
        .unwrap();
    assert!(item.is(ErrorCategory::NotFound));
    assert_eq!(item.to_string(), "Not found: No endpoint found at path folders");

    let document = endpoint
        .collection_item_single_model::<Document>("documents", "3")
        .get_unchecked();
    assert_eq!(document.model().title, "doc-3");

    let page = endpoint
        .collection_page::<Document>("documents", Pagination::default())
        .into_failure()
        .unwrap();
    assert!(page.is(ErrorCategory::NotFound));
}

#[test]
fn test_filtered_page() {
    let (endpoint, _) = endpoint();
    let params = FilterParams::new().with("folderId", "1");

    let page = endpoint
        .filtered_collection_page::<Document>("documents", "folder", &params, Pagination::new(2, 2))
        .get_unchecked();
    assert_eq!(page.total_count(), 4);
    assert_eq!(
        page.items().iter().map(|d| d.id).collect::<Vec<_>>(),
        vec![5, 7]
    );
    assert!(!page.has_next());
    assert!(page.has_previous());

    let missing = endpoint
        .filtered_collection_page::<Document>(
            "documents",
            "folder",
            &FilterParams::new(),
            Pagination::default(),
        )
        .into_failure()
        .unwrap();
    assert!(missing.is(ErrorCategory::BadRequest));

    let unknown = endpoint
        .filtered_collection_page::<Document>("documents", "author", &params, Pagination::default())
        .into_failure()
        .unwrap();
    assert!(unknown.is(ErrorCategory::NotFound));
}

#[test]
fn test_binary_after_item_fetch() {
    let (endpoint, downloads) = endpoint();

    let mut content = String::new();
    endpoint
        .collection_item_binary::<Document>("documents", "2", "content")
        .get_unchecked()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "doc-2");
    assert_eq!(downloads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_binary_not_invoked_when_item_fetch_fails() {
    let (endpoint, downloads) = endpoint();

    let missing = endpoint
        .collection_item_binary::<Document>("documents", "99", "content")
        .into_failure()
        .unwrap();
    assert!(missing.is(ErrorCategory::NotFound));
    assert!(missing.to_string().contains("Document with ID '99'"));

    let malformed = endpoint
        .collection_item_binary::<Document>("documents", "abc", "content")
        .into_failure()
        .unwrap();
    assert!(malformed.is(ErrorCategory::BadRequest));

    assert_eq!(downloads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_bidirectional_relation_reaches_folder() {
    let (endpoint, _) = endpoint();
    let registry = endpoint.resolver();

    let folders = registry.representor::<Folder, i64>().unwrap();
    let collections = folders.related_collections();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].key(), "documents");

    let folder = Folder {
        id: 1,
        name: "folder-1".to_string(),
    };
    let identifier = collections[0].identifier(&folder);
    assert_eq!(identifier.downcast_ref::<i64>(), Some(&1));
}

#[test]
fn test_dispatch_records_metrics() {
    let (endpoint, _) = endpoint();
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::with_local_recorder(&recorder, || {
        let _ = endpoint.collection_page::<Folder>("folders", Pagination::default());
        let _ = endpoint.collection_item_single_model::<Folder>("folders", "1");
    });

    let rendered = handle.render();
    assert!(rendered.contains("apio_dispatch_total"));
    assert!(rendered.contains(r#"outcome="success""#));
    assert!(rendered.contains(r#"outcome="not_found""#));
}
