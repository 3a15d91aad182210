//! Cross-resource relation registry.
//!
//! Declaring a bidirectional model on one representor implies a reverse
//! collection on the target's representor. The declaring builder cannot reach
//! the target's builder, so it reports a [`ReverseRelation`] through a
//! [`RelationCallback`]; a [`RelationRegistry`] collects those during startup,
//! keyed by target type, and later supplies them to the target's builder as
//! extra related collections.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use apio_core::ResourceType;
use parking_lot::Mutex;

use crate::related::RelatedCollection;

/// Receives the reverse relations declared while a representor is built.
pub type RelationCallback = Arc<dyn Fn(ReverseRelation) + Send + Sync>;

/// Returns a callback that discards every relation.
#[must_use]
pub fn ignore_relations() -> RelationCallback {
    Arc::new(|_| {})
}

/// A related collection to be exposed by the target of a bidirectional model.
///
/// It holds a `RelatedCollection<S>` for the target type `S`, erased so that
/// relations for different targets can travel through one callback.
pub struct ReverseRelation {
    key: String,
    model_type: ResourceType,
    collection_type: ResourceType,
    collection: Arc<dyn Any + Send + Sync>,
}

impl ReverseRelation {
    /// Wraps the collection `S` should expose.
    pub fn new<S: 'static>(collection: RelatedCollection<S>) -> Self {
        Self {
            key: collection.key().to_string(),
            model_type: ResourceType::of::<S>(),
            collection_type: collection.collection_type(),
            collection: Arc::new(collection),
        }
    }

    /// Returns the reverse collection key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the type that exposes the collection (the relation's target).
    #[must_use]
    pub const fn model_type(&self) -> ResourceType {
        self.model_type
    }

    /// Returns the type of the collection's models (the declaring type).
    #[must_use]
    pub const fn collection_type(&self) -> ResourceType {
        self.collection_type
    }

    /// Borrows the collection if `S` is the target type.
    #[must_use]
    pub fn collection<S: 'static>(&self) -> Option<&RelatedCollection<S>> {
        self.collection.downcast_ref::<RelatedCollection<S>>()
    }
}

impl Clone for ReverseRelation {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            model_type: self.model_type,
            collection_type: self.collection_type,
            collection: Arc::clone(&self.collection),
        }
    }
}

impl fmt::Debug for ReverseRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReverseRelation")
            .field("key", &self.key)
            .field("model_type", &self.model_type)
            .field("collection_type", &self.collection_type)
            .finish()
    }
}

/// Collects reverse relations and framework-contributed collections by
/// target type.
///
/// The registry is filled during the startup phase and read when the final
/// representors are built. Cloning shares the underlying storage.
///
/// # Example
///
/// ```
/// use apio_representor::{RelatedCollection, RelationRegistry, ReverseRelation};
///
/// struct Folder { id: i64 }
/// struct Document;
///
/// let registry = RelationRegistry::new();
/// let callback = registry.callback();
/// callback(ReverseRelation::new(RelatedCollection::new::<Document, _, _>(
///     "documents",
///     |f: &Folder| f.id,
/// )));
///
/// let collections = registry.collections_for::<Folder>();
/// assert_eq!(collections.len(), 1);
/// assert_eq!(collections[0].key(), "documents");
/// ```
#[derive(Clone, Default)]
pub struct RelationRegistry {
    relations: Arc<Mutex<HashMap<ResourceType, Vec<ReverseRelation>>>>,
}

impl RelationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a relation under its target type.
    pub fn register(&self, relation: ReverseRelation) {
        tracing::debug!(
            key = relation.key(),
            model_type = relation.model_type().name(),
            collection_type = relation.collection_type().name(),
            "Registered reverse relation"
        );
        self.relations
            .lock()
            .entry(relation.model_type())
            .or_default()
            .push(relation);
    }

    /// Records a collection contributed to `S` by the framework rather than
    /// by the resource author.
    pub fn register_collection<S: 'static>(&self, collection: RelatedCollection<S>) {
        self.register(ReverseRelation::new(collection));
    }

    /// Returns a callback that records into this registry.
    #[must_use]
    pub fn callback(&self) -> RelationCallback {
        let registry = self.clone();
        Arc::new(move |relation| registry.register(relation))
    }

    /// Returns the collections registered for `S`, in registration order.
    #[must_use]
    pub fn collections_for<S: 'static>(&self) -> Vec<RelatedCollection<S>> {
        self.relations
            .lock()
            .get(&ResourceType::of::<S>())
            .map(|relations| {
                relations
                    .iter()
                    .filter_map(ReverseRelation::collection::<S>)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the relations registered for `target`.
    #[must_use]
    pub fn relations_for(&self, target: ResourceType) -> Vec<ReverseRelation> {
        self.relations
            .lock()
            .get(&target)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the total number of relations recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.lock().values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RelationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationRegistry")
            .field("relation_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Folder {
        id: i64,
    }

    struct Document;

    struct User;

    #[test]
    fn test_registry_keys_by_target() {
        let registry = RelationRegistry::new();
        registry.register_collection(RelatedCollection::new::<Document, _, _>(
            "documents",
            |f: &Folder| f.id,
        ));
        registry.register_collection(RelatedCollection::new::<Folder, _, _>(
            "folders",
            |_: &User| "mine",
        ));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.collections_for::<Folder>().len(), 1);
        let for_user = registry.relations_for(ResourceType::of::<User>());
        assert_eq!(for_user.len(), 1);
        assert_eq!(for_user[0].key(), "folders");
        assert!(registry
            .relations_for(ResourceType::of::<Document>())
            .is_empty());
        assert_eq!(registry.collections_for::<User>().len(), 1);
        assert!(registry.collections_for::<Document>().is_empty());
    }

    #[test]
    fn test_registry_preserves_order_and_duplicates() {
        let registry = RelationRegistry::new();
        let callback = registry.callback();
        for key in ["b", "a", "b"] {
            callback(ReverseRelation::new(RelatedCollection::new::<Document, _, _>(
                key,
                |f: &Folder| f.id,
            )));
        }

        let keys: Vec<String> = registry
            .collections_for::<Folder>()
            .iter()
            .map(|c| c.key().to_string())
            .collect();
        assert_eq!(keys, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_reverse_relation_metadata() {
        let relation = ReverseRelation::new(RelatedCollection::new::<Document, _, _>(
            "documents",
            |f: &Folder| f.id + 1,
        ));

        assert_eq!(relation.key(), "documents");
        assert!(relation.model_type().is::<Folder>());
        assert!(relation.collection_type().is::<Document>());
        assert!(relation.collection::<User>().is_none());

        let collection = relation.collection::<Folder>().unwrap();
        assert_eq!(
            collection.identifier(&Folder { id: 1 }).downcast_ref::<i64>(),
            Some(&2)
        );
    }

    #[test]
    fn test_ignore_relations_discards() {
        let callback = ignore_relations();
        callback(ReverseRelation::new(RelatedCollection::new::<Document, _, _>(
            "documents",
            |f: &Folder| f.id,
        )));
    }
}
