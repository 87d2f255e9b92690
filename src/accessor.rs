//! Property accessors.
//!
//! An [`Accessor`] reads one reference property off a live instance through
//! the [`ObservableObject`] trait object. Accessors are built once, when a
//! type's descriptor is constructed, and reused for every change event; the
//! call itself is just a downcast and a field read.

use std::sync::Arc;

use crate::descriptor::{PropertyKind, TypeRegistry};
use crate::error::{ChainResult, ConfigurationError};
use crate::observable::{ObjectRef, ObservableObject};

/// Reads a reference property off an instance. `None` means the link is
/// currently null (or the instance is not of the declared type).
pub type Accessor = Arc<dyn Fn(&dyn ObservableObject) -> Option<ObjectRef> + Send + Sync>;

/// Build an accessor for a concrete observable type.
///
/// The returned closure downcasts the trait object back to `T` and applies
/// `read`. A downcast failure means the caller substituted an instance of an
/// unrelated type at runtime; the accessor degrades to a null link rather
/// than panicking.
pub fn reference_accessor<T, F>(read: F) -> Accessor
where
    T: ObservableObject + 'static,
    F: Fn(&T) -> Option<ObjectRef> + Send + Sync + 'static,
{
    Arc::new(move |instance: &dyn ObservableObject| {
        instance.as_any().downcast_ref::<T>().and_then(|t| read(t))
    })
}

/// Look up the cached accessor for `(type_name, property)` in the registry.
///
/// # Errors
///
/// [`ConfigurationError::UnknownType`] if the type has no descriptor,
/// [`ConfigurationError::UnresolvedSegment`] if the property does not exist,
/// [`ConfigurationError::NotAReference`] if it is a value property.
pub fn make_accessor(
    registry: &TypeRegistry,
    type_name: &str,
    property: &str,
) -> ChainResult<Accessor> {
    resolve_reference(registry, type_name, property, property).map(|(_, accessor)| accessor)
}

/// Shared lookup for the path compiler: resolve `property` on `type_name` to
/// its declared value type and accessor, reporting errors against the full
/// declared `path`.
pub(crate) fn resolve_reference(
    registry: &TypeRegistry,
    type_name: &str,
    property: &str,
    path: &str,
) -> ChainResult<(String, Accessor)> {
    let descriptor = registry
        .get(type_name)
        .ok_or_else(|| ConfigurationError::UnknownType {
            type_name: type_name.to_string(),
        })?;

    let prop =
        descriptor
            .property(property)
            .ok_or_else(|| ConfigurationError::UnresolvedSegment {
                type_name: type_name.to_string(),
                property: property.to_string(),
                path: path.to_string(),
            })?;

    match prop.kind() {
        PropertyKind::Reference {
            value_type,
            accessor,
        } => Ok((value_type.clone(), Arc::clone(accessor))),
        PropertyKind::Value => Err(ConfigurationError::NotAReference {
            type_name: type_name.to_string(),
            property: property.to_string(),
            path: path.to_string(),
        }),
    }
}
