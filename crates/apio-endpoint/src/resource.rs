//! Author-facing resource declarations.

use apio_representor::RepresentorBuilder;
use apio_routes::RoutesBuilder;

/// A resource served at one path.
///
/// A resource describes how its models are represented and which requests
/// it answers. Both declarations are written onto builders handed in by the
/// [`ResourceRegistry`](crate::ResourceRegistry), which may call
/// [`representor`](Self::representor) more than once during startup. Keep
/// both methods free of side effects.
///
/// # Example
///
/// ```
/// use apio_core::ApioError;
/// use apio_endpoint::Resource;
/// use apio_representor::RepresentorBuilder;
/// use apio_routes::RoutesBuilder;
///
/// struct Folder { id: i64, name: String }
///
/// struct FolderResource;
///
/// impl Resource for FolderResource {
///     type Model = Folder;
///     type Identifier = i64;
///
///     fn path(&self) -> &str {
///         "folders"
///     }
///
///     fn representor(
///         &self,
///         builder: RepresentorBuilder<Folder, i64>,
///     ) -> RepresentorBuilder<Folder, i64> {
///         builder
///             .types(["Folder"])
///             .identifier(|f: &Folder| f.id)
///             .add_string("name", |f: &Folder| f.name.clone())
///     }
///
///     fn routes(&self, builder: RoutesBuilder<Folder>) -> RoutesBuilder<Folder> {
///         builder.collection_item(|id: i64| {
///             Ok::<_, ApioError>(Folder { id, name: format!("folder-{id}") })
///         })
///     }
/// }
/// ```
pub trait Resource: Send + Sync + 'static {
    /// The model type this resource represents.
    type Model: 'static;

    /// The type identifying one model.
    type Identifier: 'static;

    /// The path segment the resource is served at.
    fn path(&self) -> &str;

    /// Declares the representation of [`Self::Model`].
    fn representor(
        &self,
        builder: RepresentorBuilder<Self::Model, Self::Identifier>,
    ) -> RepresentorBuilder<Self::Model, Self::Identifier>;

    /// Declares the request functions. The builder already carries the
    /// binary functions declared on the representor.
    fn routes(&self, builder: RoutesBuilder<Self::Model>) -> RoutesBuilder<Self::Model>;
}
