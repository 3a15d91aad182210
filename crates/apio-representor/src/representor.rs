//! The built, immutable representation model of a resource.

use std::fmt;

use apio_core::{BinaryFunction, ResourceType};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::field::{FieldFunction, IdentifierFunction, Language, LocalizedFunction, Number};
use crate::related::{RelatedCollection, RelatedModel};

/// Field extractors keyed by field name, in declaration order.
pub type FieldMap<T, V> = IndexMap<String, FieldFunction<T, V>>;

/// Describes how a model of type `T`, identified by an `I`, is represented.
///
/// A representor is produced once by a
/// [`RepresentorBuilder`](crate::RepresentorBuilder) and then shared
/// read-only by every renderer. It stores extractors only; none of them run
/// until a renderer asks for a value.
pub struct Representor<T, I> {
    pub(crate) model_type: ResourceType,
    pub(crate) identifier_type: ResourceType,
    pub(crate) types: Vec<String>,
    pub(crate) identifier_function: IdentifierFunction<T, I>,
    pub(crate) boolean_functions: FieldMap<T, bool>,
    pub(crate) boolean_list_functions: FieldMap<T, Vec<bool>>,
    pub(crate) number_functions: FieldMap<T, Number>,
    pub(crate) number_list_functions: FieldMap<T, Vec<Number>>,
    pub(crate) string_functions: FieldMap<T, String>,
    pub(crate) string_list_functions: FieldMap<T, Vec<String>>,
    pub(crate) date_functions: FieldMap<T, Option<DateTime<Utc>>>,
    pub(crate) localized_functions: IndexMap<String, LocalizedFunction<T>>,
    pub(crate) binary_functions: IndexMap<String, BinaryFunction<T>>,
    pub(crate) links: IndexMap<String, String>,
    pub(crate) related_models: Vec<RelatedModel<T>>,
    pub(crate) related_collections: Vec<RelatedCollection<T>>,
}

impl<T, I> Representor<T, I> {
    /// Returns the tag of the represented model type.
    #[must_use]
    pub const fn model_type(&self) -> ResourceType {
        self.model_type
    }

    /// Returns the tag of the identifier type.
    #[must_use]
    pub const fn identifier_type(&self) -> ResourceType {
        self.identifier_type
    }

    /// Returns the semantic types, in declaration order.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Returns the identifier function.
    #[must_use]
    pub fn identifier_function(&self) -> &IdentifierFunction<T, I> {
        &self.identifier_function
    }

    /// Computes the identifier of `model`.
    pub fn identifier(&self, model: &T) -> I {
        (self.identifier_function)(model)
    }

    /// Returns the boolean fields.
    #[must_use]
    pub const fn boolean_functions(&self) -> &FieldMap<T, bool> {
        &self.boolean_functions
    }

    /// Returns the boolean list fields.
    #[must_use]
    pub const fn boolean_list_functions(&self) -> &FieldMap<T, Vec<bool>> {
        &self.boolean_list_functions
    }

    /// Returns the number fields.
    #[must_use]
    pub const fn number_functions(&self) -> &FieldMap<T, Number> {
        &self.number_functions
    }

    /// Returns the number list fields.
    #[must_use]
    pub const fn number_list_functions(&self) -> &FieldMap<T, Vec<Number>> {
        &self.number_list_functions
    }

    /// Returns the string fields.
    #[must_use]
    pub const fn string_functions(&self) -> &FieldMap<T, String> {
        &self.string_functions
    }

    /// Returns the string list fields.
    #[must_use]
    pub const fn string_list_functions(&self) -> &FieldMap<T, Vec<String>> {
        &self.string_list_functions
    }

    /// Returns the date fields. An extractor may yield `None` for a missing
    /// date.
    #[must_use]
    pub const fn date_functions(&self) -> &FieldMap<T, Option<DateTime<Utc>>> {
        &self.date_functions
    }

    /// Returns the localized string fields.
    #[must_use]
    pub const fn localized_functions(&self) -> &IndexMap<String, LocalizedFunction<T>> {
        &self.localized_functions
    }

    /// Returns the binary fields.
    #[must_use]
    pub const fn binary_functions(&self) -> &IndexMap<String, BinaryFunction<T>> {
        &self.binary_functions
    }

    /// Returns the links, as key to URL.
    #[must_use]
    pub const fn links(&self) -> &IndexMap<String, String> {
        &self.links
    }

    /// Returns every related model, linked and embedded, in declaration order.
    #[must_use]
    pub fn related_models(&self) -> &[RelatedModel<T>] {
        &self.related_models
    }

    /// Returns the related models rendered as links.
    pub fn linked_models(&self) -> impl Iterator<Item = &RelatedModel<T>> {
        self.related_models.iter().filter(|m| !m.is_embedded())
    }

    /// Returns the related models rendered inline.
    pub fn embedded_models(&self) -> impl Iterator<Item = &RelatedModel<T>> {
        self.related_models.iter().filter(|m| m.is_embedded())
    }

    /// Returns the related collections: the author's first, then those
    /// contributed by other resources.
    #[must_use]
    pub fn related_collections(&self) -> &[RelatedCollection<T>] {
        &self.related_collections
    }

    /// Renders the localized field `key` of `model` in `language`.
    #[must_use]
    pub fn localized(&self, key: &str, model: &T, language: &Language) -> Option<String> {
        self.localized_functions
            .get(key)
            .map(|function| function(model, language))
    }
}

impl<T, I> Clone for Representor<T, I> {
    fn clone(&self) -> Self {
        Self {
            model_type: self.model_type,
            identifier_type: self.identifier_type,
            types: self.types.clone(),
            identifier_function: self.identifier_function.clone(),
            boolean_functions: self.boolean_functions.clone(),
            boolean_list_functions: self.boolean_list_functions.clone(),
            number_functions: self.number_functions.clone(),
            number_list_functions: self.number_list_functions.clone(),
            string_functions: self.string_functions.clone(),
            string_list_functions: self.string_list_functions.clone(),
            date_functions: self.date_functions.clone(),
            localized_functions: self.localized_functions.clone(),
            binary_functions: self.binary_functions.clone(),
            links: self.links.clone(),
            related_models: self.related_models.clone(),
            related_collections: self.related_collections.clone(),
        }
    }
}

impl<T, I> fmt::Debug for Representor<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representor")
            .field("model_type", &self.model_type)
            .field("identifier_type", &self.identifier_type)
            .field("types", &self.types)
            .field("booleans", &self.boolean_functions.keys().collect::<Vec<_>>())
            .field("numbers", &self.number_functions.keys().collect::<Vec<_>>())
            .field("strings", &self.string_functions.keys().collect::<Vec<_>>())
            .field("dates", &self.date_functions.keys().collect::<Vec<_>>())
            .field("binaries", &self.binary_functions.keys().collect::<Vec<_>>())
            .field("links", &self.links)
            .field("related_models", &self.related_models)
            .field("related_collections", &self.related_collections)
            .finish_non_exhaustive()
    }
}
