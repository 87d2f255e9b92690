//! Type descriptors and the declaration registry.
//!
//! There is no runtime reflection here: a type participates by registering a
//! [`TypeDescriptor`] that lists its properties, whether it can raise change
//! notifications, and the `(dependent property, path)` pairs it declares.
//! The registry is built once, before any registration is created, and never
//! mutated afterwards; only per-node bindings change at runtime.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::accessor::Accessor;
use crate::error::ChainResult;
use crate::path::PropertyPath;

/// How a property can be used in a dependency path.
#[derive(Clone)]
pub enum PropertyKind {
    /// A plain value. Valid only as the final path segment.
    Value,
    /// A reference to another registered object, navigable mid-path.
    Reference {
        /// Registered type name of the referenced object.
        value_type: String,
        /// Cached accessor reading the current reference.
        accessor: Accessor,
    },
}

impl fmt::Debug for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "Value"),
            Self::Reference { value_type, .. } => {
                f.debug_struct("Reference").field("value_type", value_type).finish()
            }
        }
    }
}

/// One property on a registered type.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    kind: PropertyKind,
}

impl PropertyDescriptor {
    /// The property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value or reference kind.
    #[must_use]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }
}

/// A declared `(dependent property, path)` pair.
///
/// Declarations are plain strings and intentionally serializable so they can
/// be carried in configuration payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    /// Name of the dependent property reported to the consumer callback.
    pub dependent: String,
    /// Root-relative dotted path the dependent property derives from.
    pub path: PropertyPath,
}

/// Everything the crate knows about one type.
#[derive(Debug)]
pub struct TypeDescriptor {
    type_name: String,
    observable: bool,
    properties: HashMap<String, PropertyDescriptor>,
    dependencies: Vec<DependencyDescriptor>,
}

impl TypeDescriptor {
    /// Start building a descriptor for `type_name`.
    #[must_use]
    pub fn builder(type_name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            type_name: type_name.into(),
            observable: false,
            properties: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// The registered type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether instances of this type raise named change notifications.
    #[must_use]
    pub fn is_observable(&self) -> bool {
        self.observable
    }

    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Declared dependency pairs, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[DependencyDescriptor] {
        &self.dependencies
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeDescriptorBuilder {
    type_name: String,
    observable: bool,
    properties: Vec<PropertyDescriptor>,
    dependencies: Vec<(String, String)>,
}

impl TypeDescriptorBuilder {
    /// Mark the type as able to raise named change notifications.
    #[must_use]
    pub fn observable(mut self) -> Self {
        self.observable = true;
        self
    }

    /// Declare a plain value property.
    #[must_use]
    pub fn value_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            kind: PropertyKind::Value,
        });
        self
    }

    /// Declare a navigable reference property with its cached accessor.
    #[must_use]
    pub fn reference_property(
        mut self,
        name: impl Into<String>,
        value_type: impl Into<String>,
        accessor: Accessor,
    ) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            kind: PropertyKind::Reference {
                value_type: value_type.into(),
                accessor,
            },
        });
        self
    }

    /// Declare that `dependent` derives from the dotted `path`.
    #[must_use]
    pub fn depends_on(mut self, dependent: impl Into<String>, path: impl Into<String>) -> Self {
        self.dependencies.push((dependent.into(), path.into()));
        self
    }

    /// Finish the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyPath`] if a declared path fails to
    /// parse. Deeper validation (segment resolution, observability) happens
    /// when a registration compiles the path against this registry.
    pub fn build(self) -> ChainResult<TypeDescriptor> {
        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for (dependent, path) in self.dependencies {
            dependencies.push(DependencyDescriptor {
                dependent,
                path: PropertyPath::parse(&path)?,
            });
        }

        let properties = self
            .properties
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        Ok(TypeDescriptor {
            type_name: self.type_name,
            observable: self.observable,
            properties,
            dependencies,
        })
    }
}

/// Registry mapping type names to their descriptors.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one for the same name.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.type_name.clone(), descriptor);
    }

    /// Look up a descriptor by type name.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ConfigurationError;

    use super::*;

    #[test]
    fn builder_collects_properties_and_dependencies() {
        let descriptor = TypeDescriptor::builder("Profile")
            .observable()
            .value_property("display_name")
            .depends_on("display_name", "address.city")
            .depends_on("display_name", "nickname")
            .build()
            .unwrap();

        assert!(descriptor.is_observable());
        assert!(descriptor.property("display_name").is_some());
        assert!(descriptor.property("missing").is_none());
        assert_eq!(descriptor.dependencies().len(), 2);
        assert_eq!(descriptor.dependencies()[0].dependent, "display_name");
        assert_eq!(descriptor.dependencies()[0].path.to_string(), "address.city");
    }

    #[test]
    fn bad_declared_path_fails_the_build() {
        let result = TypeDescriptor::builder("Profile")
            .depends_on("x", "a..b")
            .build();
        match result {
            Err(ConfigurationError::EmptyPath { path }) => assert_eq!(path, "a..b"),
            other => panic!("expected EmptyPath, got {other:?}"),
        }
    }

    #[test]
    fn registry_replaces_descriptors_by_name() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::builder("A").build().unwrap());
        registry.register(TypeDescriptor::builder("A").observable().build().unwrap());
        assert!(registry.get("A").unwrap().is_observable());
    }
}
