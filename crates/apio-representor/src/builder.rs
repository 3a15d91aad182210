//! Fluent construction of [`Representor`]s.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use apio_core::{ApioError, ApioResult, BinaryStream, ResourceType};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::field::{IdentifierFunction, Language, LocalizedFunction, Number};
use crate::registry::{ignore_relations, RelationCallback, ReverseRelation};
use crate::related::{RelatedCollection, RelatedModel, RelationKind};
use crate::representor::{FieldMap, Representor};

/// Supplies related collections contributed to `T` from outside its own
/// declaration, evaluated once when the representor is built.
pub type ExtrasSupplier<T> = Arc<dyn Fn() -> Vec<RelatedCollection<T>> + Send + Sync>;

/// Builder for [`Representor`].
///
/// Every `add_*` method consumes and returns the builder. Fields are kept in
/// one ordered map per kind: re-adding a key replaces the earlier extractor
/// in place, while the same key may appear under different kinds.
///
/// # Example
///
/// ```
/// use apio_representor::RepresentorBuilder;
///
/// struct Folder { id: i64, name: String, hidden: bool }
///
/// let representor = RepresentorBuilder::<Folder, i64>::new()
///     .types(["Folder"])
///     .identifier(|f: &Folder| f.id)
///     .add_string("name", |f: &Folder| f.name.clone())
///     .add_boolean("hidden", |f: &Folder| f.hidden)
///     .add_link("license", "https://creativecommons.org/licenses/by/4.0")
///     .build();
///
/// let folder = Folder { id: 3, name: "Docs".into(), hidden: false };
/// assert_eq!(representor.identifier(&folder), 3);
/// assert_eq!(representor.types(), ["Folder"]);
/// assert_eq!(representor.string_functions()["name"](&folder), "Docs");
/// ```
#[must_use]
pub struct RepresentorBuilder<T, I> {
    relation_callback: RelationCallback,
    extras: Option<ExtrasSupplier<T>>,
    types: Vec<String>,
    identifier_function: Option<IdentifierFunction<T, I>>,
    boolean_functions: FieldMap<T, bool>,
    boolean_list_functions: FieldMap<T, Vec<bool>>,
    number_functions: FieldMap<T, Number>,
    number_list_functions: FieldMap<T, Vec<Number>>,
    string_functions: FieldMap<T, String>,
    string_list_functions: FieldMap<T, Vec<String>>,
    date_functions: FieldMap<T, Option<DateTime<Utc>>>,
    localized_functions: IndexMap<String, LocalizedFunction<T>>,
    binary_functions: IndexMap<String, apio_core::BinaryFunction<T>>,
    links: IndexMap<String, String>,
    related_models: Vec<RelatedModel<T>>,
    related_collections: Vec<RelatedCollection<T>>,
}

impl<T: 'static, I: 'static> RepresentorBuilder<T, I> {
    /// Creates a builder that discards bidirectional registrations and has
    /// no extra collections.
    pub fn new() -> Self {
        Self {
            relation_callback: ignore_relations(),
            extras: None,
            types: Vec::new(),
            identifier_function: None,
            boolean_functions: IndexMap::new(),
            boolean_list_functions: IndexMap::new(),
            number_functions: IndexMap::new(),
            number_list_functions: IndexMap::new(),
            string_functions: IndexMap::new(),
            string_list_functions: IndexMap::new(),
            date_functions: IndexMap::new(),
            localized_functions: IndexMap::new(),
            binary_functions: IndexMap::new(),
            links: IndexMap::new(),
            related_models: Vec::new(),
            related_collections: Vec::new(),
        }
    }

    /// Sets the callback that receives the reverse side of every
    /// bidirectional model declared on this builder.
    pub fn relation_callback(mut self, callback: RelationCallback) -> Self {
        self.relation_callback = callback;
        self
    }

    /// Sets the supplier of related collections contributed by other
    /// resources. It runs once, during [`build`](Self::build).
    pub fn extras<F>(mut self, supplier: F) -> Self
    where
        F: Fn() -> Vec<RelatedCollection<T>> + Send + Sync + 'static,
    {
        self.extras = Some(Arc::new(supplier));
        self
    }

    /// Replaces the semantic types.
    pub fn types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Appends one semantic type.
    pub fn add_type(mut self, value: impl Into<String>) -> Self {
        self.types.push(value.into());
        self
    }

    /// Sets the identifier function.
    pub fn identifier<F>(mut self, function: F) -> Self
    where
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        self.identifier_function = Some(Arc::new(function));
        self
    }

    /// Adds a boolean field.
    pub fn add_boolean<F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.boolean_functions.insert(key.into(), Arc::new(function));
        self
    }

    /// Adds a boolean list field.
    pub fn add_boolean_list<F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        F: Fn(&T) -> Vec<bool> + Send + Sync + 'static,
    {
        self.boolean_list_functions
            .insert(key.into(), Arc::new(function));
        self
    }

    /// Adds a number field. Integral values stay integral.
    pub fn add_number<N, F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        N: Into<Number>,
        F: Fn(&T) -> N + Send + Sync + 'static,
    {
        self.number_functions
            .insert(key.into(), Arc::new(move |model: &T| function(model).into()));
        self
    }

    /// Adds a number list field.
    pub fn add_number_list<N, F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        N: Into<Number>,
        F: Fn(&T) -> Vec<N> + Send + Sync + 'static,
    {
        self.number_list_functions.insert(
            key.into(),
            Arc::new(move |model: &T| function(model).into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Adds a string field.
    pub fn add_string<S, F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        S: Into<String>,
        F: Fn(&T) -> S + Send + Sync + 'static,
    {
        self.string_functions
            .insert(key.into(), Arc::new(move |model: &T| function(model).into()));
        self
    }

    /// Adds a string list field.
    pub fn add_string_list<F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
    {
        self.string_list_functions
            .insert(key.into(), Arc::new(function));
        self
    }

    /// Adds a date field. The extractor may return `None`.
    pub fn add_date<F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        F: Fn(&T) -> Option<DateTime<Utc>> + Send + Sync + 'static,
    {
        self.date_functions.insert(key.into(), Arc::new(function));
        self
    }

    /// Adds a string field rendered in the requested language.
    pub fn add_localized_string<S, F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        S: Into<String>,
        F: Fn(&T, &Language) -> S + Send + Sync + 'static,
    {
        self.localized_functions.insert(
            key.into(),
            Arc::new(move |model: &T, language: &Language| function(model, language).into()),
        );
        self
    }

    /// Adds a binary field.
    pub fn add_binary<F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        F: Fn(&T) -> Result<BinaryStream, ApioError> + Send + Sync + 'static,
    {
        self.binary_functions.insert(key.into(), Arc::new(function));
        self
    }

    /// Adds a link to an external URL.
    pub fn add_link(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(key.into(), url.into());
        self
    }

    /// Adds a to-one relation rendered as a link.
    pub fn add_linked_model<S, F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        S: Any + Send + Sync,
        F: Fn(&T) -> Option<S> + Send + Sync + 'static,
    {
        self.related_models
            .push(RelatedModel::new(key, RelationKind::Linked, function));
        self
    }

    /// Adds a to-one relation rendered inline.
    pub fn add_embedded_model<S, F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        S: Any + Send + Sync,
        F: Fn(&T) -> Option<S> + Send + Sync + 'static,
    {
        self.related_models
            .push(RelatedModel::new(key, RelationKind::Embedded, function));
        self
    }

    /// Adds a linked relation to `S` whose reverse side, a collection of `T`
    /// named `reverse_key`, must appear on `S`'s representor.
    ///
    /// `target_identifier` computes, from an `S`, the value that selects its
    /// collection of `T`. The reverse side is reported to the relation
    /// callback immediately.
    ///
    /// # Example
    ///
    /// ```
    /// use apio_representor::{RelationRegistry, RepresentorBuilder};
    ///
    /// struct Folder { id: i64 }
    /// struct Document { id: i64, folder_id: i64 }
    ///
    /// let registry = RelationRegistry::new();
    /// let documents = RepresentorBuilder::<Document, i64>::new()
    ///     .relation_callback(registry.callback())
    ///     .identifier(|d: &Document| d.id)
    ///     .add_bidirectional_model(
    ///         "folder",
    ///         "documents",
    ///         |d: &Document| Some(Folder { id: d.folder_id }),
    ///         |f: &Folder| f.id,
    ///     )
    ///     .build();
    ///
    /// let folder_link = &documents.related_models()[0];
    /// assert_eq!(folder_link.reverse_key(), Some("documents"));
    ///
    /// let folder = folder_link.model(&Document { id: 1, folder_id: 6 }).unwrap();
    /// let folder_id = folder_link.target_identifier(&folder).unwrap();
    /// assert_eq!(folder_id.downcast_ref::<i64>(), Some(&6));
    /// assert_eq!(registry.collections_for::<Folder>()[0].key(), "documents");
    /// ```
    pub fn add_bidirectional_model<S, J, F, G>(
        mut self,
        key: impl Into<String>,
        reverse_key: impl Into<String>,
        function: F,
        target_identifier: G,
    ) -> Self
    where
        S: Any + Send + Sync,
        J: Any + Send + Sync,
        F: Fn(&T) -> Option<S> + Send + Sync + 'static,
        G: Fn(&S) -> J + Send + Sync + 'static,
    {
        let reverse_key = reverse_key.into();
        let target_identifier = Arc::new(target_identifier);
        let collection_identifier = Arc::clone(&target_identifier);
        let reverse = RelatedCollection::new::<T, _, _>(reverse_key.clone(), move |target: &S| {
            (*collection_identifier)(target)
        });
        (self.relation_callback)(ReverseRelation::new(reverse));

        self.related_models.push(
            RelatedModel::new(key, RelationKind::Linked, function)
                .with_reverse_key(reverse_key)
                .with_target_identifier(move |target: &S| (*target_identifier)(target)),
        );
        self
    }

    /// Adds a to-many relation to a collection of `C`. Repeated keys are
    /// kept as separate entries.
    pub fn add_related_collection<C, J, F>(mut self, key: impl Into<String>, function: F) -> Self
    where
        C: ?Sized + 'static,
        J: Any + Send + Sync,
        F: Fn(&T) -> J + Send + Sync + 'static,
    {
        self.related_collections
            .push(RelatedCollection::new::<C, _, _>(key, function));
        self
    }

    /// Builds the representor, appending the extra collections after the
    /// declared ones.
    ///
    /// # Errors
    ///
    /// Returns [`ApioError::Validation`] if no identifier function was set.
    pub fn try_build(self) -> ApioResult<Representor<T, I>> {
        let model_type = ResourceType::of::<T>();
        let Some(identifier_function) = self.identifier_function else {
            return Err(ApioError::validation(format!(
                "representor for {model_type} has no identifier function"
            )));
        };

        let mut related_collections = self.related_collections;
        if let Some(extras) = &self.extras {
            related_collections.extend(extras());
        }

        tracing::trace!(
            model_type = model_type.name(),
            types = self.types.len(),
            related_models = self.related_models.len(),
            related_collections = related_collections.len(),
            "Built representor"
        );

        Ok(Representor {
            model_type,
            identifier_type: ResourceType::of::<I>(),
            types: self.types,
            identifier_function,
            boolean_functions: self.boolean_functions,
            boolean_list_functions: self.boolean_list_functions,
            number_functions: self.number_functions,
            number_list_functions: self.number_list_functions,
            string_functions: self.string_functions,
            string_list_functions: self.string_list_functions,
            date_functions: self.date_functions,
            localized_functions: self.localized_functions,
            binary_functions: self.binary_functions,
            links: self.links,
            related_models: self.related_models,
            related_collections,
        })
    }

    /// Builds the representor.
    ///
    /// # Panics
    ///
    /// Panics if no identifier function was set. Use
    /// [`try_build`](Self::try_build) to get an error instead.
    #[must_use]
    pub fn build(self) -> Representor<T, I> {
        match self.try_build() {
            Ok(representor) => representor,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T: 'static, I: 'static> Default for RepresentorBuilder<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, I> fmt::Debug for RepresentorBuilder<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepresentorBuilder")
            .field("types", &self.types)
            .field("has_identifier", &self.identifier_function.is_some())
            .field("has_extras", &self.extras.is_some())
            .field("related_models", &self.related_models.len())
            .field("related_collections", &self.related_collections.len())
            .finish_non_exhaustive()
    }
}
