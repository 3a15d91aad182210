//! Startup assembly of resources.
//!
//! Building a registry runs in two phases. The first declares every
//! representor with a callback that records bidirectional relations by
//! target type. The second builds the final representors, each fed the
//! collections the first phase recorded for its model type, and then the
//! routes. This lets a resource declared early receive collections from one
//! declared after it.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use apio_core::{ApioError, ApioResult, ResourceType};
use apio_representor::{
    ignore_relations, RelatedCollection, RelationCallback, RelationRegistry, Representor,
    RepresentorBuilder,
};
use apio_routes::RoutesBuilder;
use apio_telemetry::metrics::record_registered_resources;

use crate::resolver::{ErasedRoutes, RoutesResolver, RoutesTable};
use crate::resource::Resource;

type ErasedRepresentor = Arc<dyn Any + Send + Sync>;

struct Assembled {
    representor: ErasedRepresentor,
    routes: ErasedRoutes,
}

trait ErasedResource: Send + Sync {
    fn path(&self) -> &str;

    fn model_type(&self) -> ResourceType;

    fn declare(&self, callback: RelationCallback);

    fn assemble(&self, relations: &RelationRegistry) -> ApioResult<Assembled>;
}

impl<R: Resource> ErasedResource for R {
    fn path(&self) -> &str {
        Resource::path(self)
    }

    fn model_type(&self) -> ResourceType {
        ResourceType::of::<R::Model>()
    }

    fn declare(&self, callback: RelationCallback) {
        let _ = self.representor(RepresentorBuilder::new().relation_callback(callback));
    }

    fn assemble(&self, relations: &RelationRegistry) -> ApioResult<Assembled> {
        let relations = relations.clone();
        let representor = self
            .representor(
                RepresentorBuilder::new()
                    .relation_callback(ignore_relations())
                    .extras(move || relations.collections_for::<R::Model>()),
            )
            .try_build()?;

        let routes = self
            .routes(RoutesBuilder::new().binaries(representor.binary_functions()))
            .build();

        Ok(Assembled {
            representor: Arc::new(representor),
            routes: Arc::new(routes),
        })
    }
}

/// The resources of an application, ready for dispatch.
///
/// Implements [`RoutesResolver`], so it can back a
/// [`RootEndpoint`](crate::RootEndpoint) directly, and hands out the built
/// representors to renderers.
///
/// # Example
///
/// ```
/// use apio_core::ApioError;
/// use apio_endpoint::{Resource, ResourceRegistry, RootEndpoint};
/// use apio_representor::RepresentorBuilder;
/// use apio_routes::RoutesBuilder;
///
/// struct Tag { name: String }
///
/// struct Tags;
///
/// impl Resource for Tags {
///     type Model = Tag;
///     type Identifier = String;
///
///     fn path(&self) -> &str {
///         "tags"
///     }
///
///     fn representor(
///         &self,
///         builder: RepresentorBuilder<Tag, String>,
///     ) -> RepresentorBuilder<Tag, String> {
///         builder.identifier(|t: &Tag| t.name.clone())
///     }
///
///     fn routes(&self, builder: RoutesBuilder<Tag>) -> RoutesBuilder<Tag> {
///         builder.collection_item(|name: String| Ok::<_, ApioError>(Tag { name }))
///     }
/// }
///
/// let registry = ResourceRegistry::builder().resource(Tags).build()?;
/// assert_eq!(registry.path_for::<Tag>(), Some("tags"));
///
/// let endpoint = RootEndpoint::new(registry);
/// let tag = endpoint.collection_item_single_model::<Tag>("tags", "rust");
/// assert_eq!(tag.get_unchecked().model().name, "rust");
/// # Ok::<(), ApioError>(())
/// ```
pub struct ResourceRegistry {
    routes: RoutesTable,
    representors: HashMap<ResourceType, ErasedRepresentor>,
    paths: HashMap<ResourceType, String>,
    relations: RelationRegistry,
}

impl ResourceRegistry {
    /// Returns a builder.
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::new()
    }

    /// Returns the representor built for model type `T`.
    ///
    /// Returns `None` if no resource represents `T` or if its identifier
    /// type is not `I`.
    #[must_use]
    pub fn representor<T: 'static, I: 'static>(&self) -> Option<Arc<Representor<T, I>>> {
        self.representors
            .get(&ResourceType::of::<T>())
            .and_then(|erased| Arc::clone(erased).downcast::<Representor<T, I>>().ok())
    }

    /// Returns the path serving model type `T`.
    #[must_use]
    pub fn path_for<T: 'static>(&self) -> Option<&str> {
        self.paths.get(&ResourceType::of::<T>()).map(String::as_str)
    }

    /// Returns the relations recorded during startup.
    #[must_use]
    pub const fn relations(&self) -> &RelationRegistry {
        &self.relations
    }

    /// Returns the routes table.
    #[must_use]
    pub const fn routes(&self) -> &RoutesTable {
        &self.routes
    }

    /// Returns the number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if there are no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RoutesResolver for ResourceRegistry {
    fn resolve(&self, path: &str) -> Option<ErasedRoutes> {
        self.routes.resolve(path)
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<(&str, &str)> = self
            .paths
            .iter()
            .map(|(model_type, path)| (path.as_str(), model_type.short_name()))
            .collect();
        paths.sort_unstable();
        f.debug_struct("ResourceRegistry")
            .field("resources", &paths)
            .field("relations", &self.relations.len())
            .finish()
    }
}

/// Builder for [`ResourceRegistry`].
#[must_use]
pub struct ResourceRegistryBuilder {
    resources: Vec<Box<dyn ErasedResource>>,
    relations: RelationRegistry,
}

impl ResourceRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            relations: RelationRegistry::new(),
        }
    }

    /// Adds a resource.
    pub fn resource<R: Resource>(mut self, resource: R) -> Self {
        self.resources.push(Box::new(resource));
        self
    }

    /// Contributes a related collection to every representor of `S`,
    /// alongside the ones recorded from bidirectional relations.
    pub fn related_collection<S: 'static>(self, collection: RelatedCollection<S>) -> Self {
        self.relations.register_collection(collection);
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ApioError::Validation`] if two resources share a path or a
    /// model type, or if a representor has no identifier function.
    pub fn build(self) -> ApioResult<ResourceRegistry> {
        let mut paths: HashMap<ResourceType, String> = HashMap::new();
        for resource in &self.resources {
            let model_type = resource.model_type();
            if let Some((owner, _)) = paths
                .iter()
                .find(|(_, path)| path.as_str() == resource.path())
            {
                return Err(ApioError::validation(format!(
                    "path '{}' is served by both {owner} and {model_type}",
                    resource.path()
                )));
            }
            if let Some(path) = paths.get(&model_type) {
                return Err(ApioError::validation(format!(
                    "{model_type} is already served at '{path}'"
                )));
            }
            paths.insert(model_type, resource.path().to_string());
        }

        for resource in &self.resources {
            resource.declare(self.relations.callback());
        }
        tracing::debug!(
            relations = self.relations.len(),
            "Collected bidirectional relations"
        );

        let mut routes = RoutesTable::new();
        let mut representors = HashMap::new();
        for resource in &self.resources {
            let model_type = resource.model_type();
            let assembled = resource.assemble(&self.relations)?;
            routes.register_erased(resource.path().to_string(), assembled.routes);
            representors.insert(model_type, assembled.representor);
            let reverse_keys: Vec<String> = self
                .relations
                .relations_for(model_type)
                .iter()
                .map(|relation| relation.key().to_string())
                .collect();
            tracing::info!(
                path = resource.path(),
                model_type = model_type.name(),
                reverse_collections = ?reverse_keys,
                "Resource registered"
            );
        }

        record_registered_resources(routes.len());

        Ok(ResourceRegistry {
            routes,
            representors,
            paths,
            relations: self.relations,
        })
    }
}

impl Default for ResourceRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResourceRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistryBuilder")
            .field(
                "paths",
                &self.resources.iter().map(|r| r.path()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
