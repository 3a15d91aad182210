//! Relationship descriptors.
//!
//! A [`RelatedModel`] describes a to-one relation (a document's folder, its
//! author) and a [`RelatedCollection`] a to-many relation identified only by
//! the value used to query the target collection.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use apio_core::{AnyValue, ResourceType};

/// How a related model appears in a representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Rendered as a link to the related resource.
    Linked,
    /// Rendered inline, inside the parent representation.
    Embedded,
}

/// Extracts an optional related model from an entity.
pub type ModelFunction<T> = Arc<dyn Fn(&T) -> Option<AnyValue> + Send + Sync>;

/// Extracts the identifier used to query a related collection.
pub type CollectionIdentifierFunction<T> = Arc<dyn Fn(&T) -> AnyValue + Send + Sync>;

/// Computes a related model's own identifier from the erased value returned
/// by a [`ModelFunction`]. Yields `None` if the value is not of the
/// relation's model type.
pub type TargetIdentifierFunction = Arc<dyn Fn(&AnyValue) -> Option<AnyValue> + Send + Sync>;

/// A to-one relation from `T` to another resource.
///
/// The model function returns `None` when the relation is absent for an
/// instance; renderers omit the relation in that case.
pub struct RelatedModel<T> {
    key: String,
    model_type: ResourceType,
    kind: RelationKind,
    reverse_key: Option<String>,
    target_identifier_function: Option<TargetIdentifierFunction>,
    model_function: ModelFunction<T>,
}

impl<T> RelatedModel<T> {
    /// Creates a descriptor for a relation to models of type `S`.
    ///
    /// # Example
    ///
    /// ```
    /// use apio_representor::{RelatedModel, RelationKind};
    ///
    /// struct Folder { id: i64 }
    /// struct Document { folder_id: Option<i64> }
    ///
    /// let related = RelatedModel::new("folder", RelationKind::Linked, |d: &Document| {
    ///     d.folder_id.map(|id| Folder { id })
    /// });
    ///
    /// let document = Document { folder_id: Some(4) };
    /// let folder = related.model(&document).unwrap();
    /// assert_eq!(folder.downcast_ref::<Folder>().unwrap().id, 4);
    /// assert!(related.model(&Document { folder_id: None }).is_none());
    /// ```
    pub fn new<S, F>(key: impl Into<String>, kind: RelationKind, function: F) -> Self
    where
        T: 'static,
        S: Any + Send + Sync,
        F: Fn(&T) -> Option<S> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            model_type: ResourceType::of::<S>(),
            kind,
            reverse_key: None,
            target_identifier_function: None,
            model_function: Arc::new(move |entity: &T| function(entity).map(AnyValue::new)),
        }
    }

    /// Marks this relation as bidirectional: the target exposes `reverse_key`
    /// as a collection of `T`.
    #[must_use]
    pub fn with_reverse_key(mut self, reverse_key: impl Into<String>) -> Self {
        self.reverse_key = Some(reverse_key.into());
        self
    }

    /// Sets the function computing the related model's own identifier.
    ///
    /// `S` must be the model type this relation was created for.
    ///
    /// # Example
    ///
    /// ```
    /// use apio_representor::{RelatedModel, RelationKind};
    ///
    /// struct Folder { id: i64 }
    /// struct Document { folder_id: i64 }
    ///
    /// let related = RelatedModel::new("folder", RelationKind::Linked, |d: &Document| {
    ///     Some(Folder { id: d.folder_id })
    /// })
    /// .with_target_identifier(|f: &Folder| f.id);
    ///
    /// let folder = related.model(&Document { folder_id: 8 }).unwrap();
    /// let id = related.target_identifier(&folder).unwrap();
    /// assert_eq!(id.downcast_ref::<i64>(), Some(&8));
    /// ```
    #[must_use]
    pub fn with_target_identifier<S, J, G>(mut self, function: G) -> Self
    where
        S: Any,
        J: Any + Send + Sync,
        G: Fn(&S) -> J + Send + Sync + 'static,
    {
        self.target_identifier_function = Some(Arc::new(move |model: &AnyValue| {
            model.downcast_ref::<S>().map(|target| AnyValue::new(function(target)))
        }));
        self
    }

    /// Returns the relation key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the type of the related model.
    #[must_use]
    pub const fn model_type(&self) -> ResourceType {
        self.model_type
    }

    /// Returns whether the model is linked or embedded.
    #[must_use]
    pub const fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Returns `true` for embedded relations.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.kind == RelationKind::Embedded
    }

    /// Returns `true` if the target exposes a reverse collection.
    #[must_use]
    pub const fn is_bidirectional(&self) -> bool {
        self.reverse_key.is_some()
    }

    /// Returns the reverse collection key of a bidirectional relation.
    #[must_use]
    pub fn reverse_key(&self) -> Option<&str> {
        self.reverse_key.as_deref()
    }

    /// Returns the function computing the related model's identifier, if
    /// one was set.
    #[must_use]
    pub fn target_identifier_function(&self) -> Option<&TargetIdentifierFunction> {
        self.target_identifier_function.as_ref()
    }

    /// Computes the identifier of a model extracted by [`model`](Self::model).
    ///
    /// Returns `None` if no identifier function was set or `model` is not of
    /// the relation's model type.
    #[must_use]
    pub fn target_identifier(&self, model: &AnyValue) -> Option<AnyValue> {
        self.target_identifier_function
            .as_ref()
            .and_then(|function| function(model))
    }

    /// Returns the model function.
    #[must_use]
    pub fn model_function(&self) -> &ModelFunction<T> {
        &self.model_function
    }

    /// Extracts the related model from `entity`, if present.
    #[must_use]
    pub fn model(&self, entity: &T) -> Option<AnyValue> {
        (self.model_function)(entity)
    }
}

impl<T> Clone for RelatedModel<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            model_type: self.model_type,
            kind: self.kind,
            reverse_key: self.reverse_key.clone(),
            target_identifier_function: self.target_identifier_function.clone(),
            model_function: Arc::clone(&self.model_function),
        }
    }
}

impl<T> fmt::Debug for RelatedModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedModel")
            .field("key", &self.key)
            .field("model_type", &self.model_type)
            .field("kind", &self.kind)
            .field("reverse_key", &self.reverse_key)
            .field(
                "has_target_identifier",
                &self.target_identifier_function.is_some(),
            )
            .finish_non_exhaustive()
    }
}

/// A to-many relation from `T` to a collection of another resource.
///
/// Only the identity of the collection is stored; its items are fetched
/// through the target's page function when requested.
pub struct RelatedCollection<T> {
    key: String,
    collection_type: ResourceType,
    identifier_function: CollectionIdentifierFunction<T>,
}

impl<T> RelatedCollection<T> {
    /// Creates a descriptor for a collection of `C` models, queried by the
    /// identifier `function` computes from a `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use apio_representor::RelatedCollection;
    ///
    /// struct Folder { id: i64 }
    /// struct Document;
    ///
    /// let documents = RelatedCollection::new::<Document, _, _>("documents", |f: &Folder| f.id);
    /// let id = documents.identifier(&Folder { id: 12 });
    /// assert_eq!(id.downcast_ref::<i64>(), Some(&12));
    /// ```
    pub fn new<C, I, F>(key: impl Into<String>, function: F) -> Self
    where
        T: 'static,
        C: ?Sized + 'static,
        I: Any + Send + Sync,
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            collection_type: ResourceType::of::<C>(),
            identifier_function: Arc::new(move |entity: &T| AnyValue::new(function(entity))),
        }
    }

    /// Returns the collection key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the type of the collection's models.
    #[must_use]
    pub const fn collection_type(&self) -> ResourceType {
        self.collection_type
    }

    /// Returns the identifier function.
    #[must_use]
    pub fn identifier_function(&self) -> &CollectionIdentifierFunction<T> {
        &self.identifier_function
    }

    /// Computes the collection identifier for `entity`.
    #[must_use]
    pub fn identifier(&self, entity: &T) -> AnyValue {
        (self.identifier_function)(entity)
    }
}

impl<T> Clone for RelatedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            collection_type: self.collection_type,
            identifier_function: Arc::clone(&self.identifier_function),
        }
    }
}

impl<T> fmt::Debug for RelatedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedCollection")
            .field("key", &self.key)
            .field("collection_type", &self.collection_type)
            .finish_non_exhaustive()
    }
}
