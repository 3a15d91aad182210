//! Runtime type tags and type-erased values.
//!
//! Representors and routes for many entity types live side by side in one
//! process. [`ResourceType`] names a Rust type at runtime (its `TypeId` plus a
//! readable name) and [`AnyValue`] carries a value whose type is only known to
//! the resource that produced it, such as the target of a related model.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::sync::Arc;

use crate::ApioError;

/// A readable stream of binary content, such as a document's bytes.
///
/// The core hands streams to the caller unread; the caller owns and closes
/// them.
pub type BinaryStream = Box<dyn Read + Send>;

/// Extracts a binary stream from an entity.
pub type BinaryFunction<T> = Arc<dyn Fn(&T) -> Result<BinaryStream, ApioError> + Send + Sync>;

/// A runtime tag for a Rust type.
///
/// Equality and hashing use the `TypeId` only.
///
/// # Example
///
/// ```
/// use apio_core::ResourceType;
///
/// struct Folder;
///
/// let folder = ResourceType::of::<Folder>();
/// assert_eq!(folder, ResourceType::of::<Folder>());
/// assert_eq!(folder.short_name(), "Folder");
/// ```
#[derive(Clone, Copy)]
pub struct ResourceType {
    id: TypeId,
    name: &'static str,
}

impl ResourceType {
    /// Returns the tag for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Returns `true` if this tag names `T`.
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ResourceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResourceType {}

impl Hash for ResourceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceType").field(&self.name).finish()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A type-erased, thread-safe value.
///
/// # Example
///
/// ```
/// use apio_core::AnyValue;
///
/// let value = AnyValue::new(23_i64);
/// assert!(value.is::<i64>());
/// assert_eq!(value.downcast_ref::<i64>(), Some(&23));
/// assert_eq!(value.downcast_ref::<String>(), None);
/// ```
pub struct AnyValue {
    inner: Box<dyn Any + Send + Sync>,
    value_type: ResourceType,
}

impl AnyValue {
    /// Wraps a value.
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            inner: Box::new(value),
            value_type: ResourceType::of::<V>(),
        }
    }

    /// Returns the tag of the wrapped value's type.
    #[must_use]
    pub const fn value_type(&self) -> ResourceType {
        self.value_type
    }

    /// Returns `true` if the wrapped value is a `V`.
    #[must_use]
    pub fn is<V: Any>(&self) -> bool {
        self.inner.is::<V>()
    }

    /// Borrows the wrapped value as a `V`.
    #[must_use]
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.inner.downcast_ref::<V>()
    }

    /// Takes the wrapped value as a `V`, or returns `self` unchanged.
    pub fn downcast<V: Any>(self) -> Result<V, Self> {
        let value_type = self.value_type;
        self.inner
            .downcast::<V>()
            .map(|boxed| *boxed)
            .map_err(|inner| Self { inner, value_type })
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyValue")
            .field("value_type", &self.value_type.name())
            .finish_non_exhaustive()
    }
}
