//! The path compiler: declared paths into instance-independent chains.
//!
//! Compilation walks the path left to right, tracking the type reachable at
//! each depth, and fails fast on the first unresolvable or non-observable
//! segment. The result is immutable and deterministic: compiling the same
//! path against the same registry always yields an equivalent chain.

use std::sync::Arc;

use tracing::trace;

use crate::accessor::{resolve_reference, Accessor};
use crate::descriptor::TypeRegistry;
use crate::error::{ChainResult, ConfigurationError};
use crate::path::PropertyPath;

use super::node::{ChainNode, NotifyFn};

/// One compiled link: the property a node watches and the accessor that
/// reads the downstream value.
pub(crate) struct LinkDescriptor {
    watched: String,
    accessor: Accessor,
}

/// The compiled, instance-independent form of a [`PropertyPath`]:
/// link descriptors outermost first, ending with the leaf property name the
/// terminal node watches.
pub(crate) struct Chain {
    links: Vec<LinkDescriptor>,
    leaf: String,
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field(
                "links",
                &self
                    .links
                    .iter()
                    .map(|link| link.watched.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("leaf", &self.leaf)
            .finish()
    }
}

impl Chain {
    /// Number of nodes a bound instance of this chain holds.
    pub(crate) fn depth(&self) -> usize {
        self.links.len() + 1
    }

    /// Build the node tree for this chain: the terminal first, then each
    /// link wrapped outward. The returned node is the outermost, ready to be
    /// bound to a root instance.
    pub(crate) fn instantiate(&self, notify: &NotifyFn) -> Arc<ChainNode> {
        let mut node = ChainNode::terminal(self.leaf.clone(), Arc::clone(notify));
        for link in self.links.iter().rev() {
            node = ChainNode::link(
                link.watched.clone(),
                Arc::clone(&link.accessor),
                node,
                Arc::clone(notify),
            );
        }
        node
    }
}

/// Compile `path` against `root_type`.
///
/// Every segment except the last must resolve on an observable-capable type
/// to a reference property; the last segment must merely resolve on the type
/// reached at that depth.
///
/// # Errors
///
/// The first [`ConfigurationError`] encountered, with the declaring type,
/// failing segment and full path attached.
pub(crate) fn compile(
    registry: &TypeRegistry,
    root_type: &str,
    path: &PropertyPath,
) -> ChainResult<Chain> {
    let path_text = path.to_string();
    let segments = path.segments();
    let mut current = root_type.to_string();
    let mut links = Vec::with_capacity(segments.len() - 1);

    for segment in &segments[..segments.len() - 1] {
        let descriptor =
            registry
                .get(&current)
                .ok_or_else(|| ConfigurationError::UnknownType {
                    type_name: current.clone(),
                })?;
        if !descriptor.is_observable() {
            return Err(ConfigurationError::NotObservable {
                type_name: current.clone(),
                path: path_text.clone(),
            });
        }

        let (value_type, accessor) = resolve_reference(registry, &current, segment, &path_text)?;
        links.push(LinkDescriptor {
            watched: segment.clone(),
            accessor,
        });
        current = value_type;
    }

    let leaf = path.leaf();
    let descriptor = registry
        .get(&current)
        .ok_or_else(|| ConfigurationError::UnknownType {
            type_name: current.clone(),
        })?;
    if descriptor.property(leaf).is_none() {
        return Err(ConfigurationError::UnresolvedSegment {
            type_name: current.clone(),
            property: leaf.to_string(),
            path: path_text.clone(),
        });
    }

    trace!(path = %path_text, root_type, depth = segments.len(), "compiled dependency chain");
    Ok(Chain {
        links,
        leaf: leaf.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::accessor::reference_accessor;
    use crate::descriptor::TypeDescriptor;
    use crate::observable::{ChangeNotifier, ObjectRef, ObservableObject};

    use super::*;

    struct City {
        notifier: ChangeNotifier,
    }

    struct Address {
        notifier: ChangeNotifier,
        city: std::sync::Mutex<Option<Arc<City>>>,
    }

    impl ObservableObject for City {
        fn type_name(&self) -> &'static str {
            "City"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn notifier(&self) -> &ChangeNotifier {
            &self.notifier
        }
    }

    impl ObservableObject for Address {
        fn type_name(&self) -> &'static str {
            "Address"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn notifier(&self) -> &ChangeNotifier {
            &self.notifier
        }
    }

    fn registry(address_observable: bool) -> TypeRegistry {
        let mut registry = TypeRegistry::new();

        let mut address = TypeDescriptor::builder("Address");
        if address_observable {
            address = address.observable();
        }
        registry.register(
            address
                .reference_property(
                    "city",
                    "City",
                    reference_accessor::<Address, _>(|a| {
                        a.city.lock().unwrap().clone().map(|c| c as ObjectRef)
                    }),
                )
                .value_property("street")
                .build()
                .unwrap(),
        );

        registry.register(
            TypeDescriptor::builder("City")
                .observable()
                .value_property("name")
                .build()
                .unwrap(),
        );

        registry
    }

    fn parse(path: &str) -> PropertyPath {
        PropertyPath::parse(path).unwrap()
    }

    #[test]
    fn compiles_nested_path_with_one_link_per_intermediate() {
        let registry = registry(true);
        let chain = compile(&registry, "Address", &parse("city.name")).unwrap();
        assert_eq!(chain.depth(), 2);
        assert_eq!(chain.links.len(), 1);
        assert_eq!(chain.links[0].watched, "city");
        assert_eq!(chain.leaf, "name");
    }

    #[test]
    fn compiles_single_segment_path_with_no_links() {
        let registry = registry(true);
        let chain = compile(&registry, "Address", &parse("street")).unwrap();
        assert_eq!(chain.depth(), 1);
        assert!(chain.links.is_empty());
        assert_eq!(chain.leaf, "street");
    }

    #[test]
    fn leaf_type_need_not_be_observable() {
        // "city" terminates on Address itself; Address observability is not
        // required because "city" is the last segment.
        let registry = registry(false);
        assert!(compile(&registry, "Address", &parse("city")).is_ok());
    }

    #[test]
    fn non_observable_intermediate_fails() {
        let mut registry = registry(true);
        // Re-register Address without the observable capability.
        registry.register(
            TypeDescriptor::builder("Address")
                .reference_property(
                    "city",
                    "City",
                    reference_accessor::<Address, _>(|a| {
                        a.city.lock().unwrap().clone().map(|c| c as ObjectRef)
                    }),
                )
                .build()
                .unwrap(),
        );

        match compile(&registry, "Address", &parse("city.name")) {
            Err(ConfigurationError::NotObservable { type_name, path }) => {
                assert_eq!(type_name, "Address");
                assert_eq!(path, "city.name");
            }
            other => panic!("expected NotObservable, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_intermediate_segment_fails() {
        let registry = registry(true);
        match compile(&registry, "Address", &parse("town.name")) {
            Err(ConfigurationError::UnresolvedSegment {
                type_name,
                property,
                path,
            }) => {
                assert_eq!(type_name, "Address");
                assert_eq!(property, "town");
                assert_eq!(path, "town.name");
            }
            other => panic!("expected UnresolvedSegment, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_leaf_segment_fails() {
        let registry = registry(true);
        match compile(&registry, "Address", &parse("city.mayor")) {
            Err(ConfigurationError::UnresolvedSegment {
                type_name,
                property,
                ..
            }) => {
                assert_eq!(type_name, "City");
                assert_eq!(property, "mayor");
            }
            other => panic!("expected UnresolvedSegment, got {other:?}"),
        }
    }

    #[test]
    fn value_property_cannot_be_traversed() {
        let registry = registry(true);
        match compile(&registry, "Address", &parse("street.length")) {
            Err(ConfigurationError::NotAReference { property, .. }) => {
                assert_eq!(property, "street");
            }
            other => panic!("expected NotAReference, got {other:?}"),
        }
    }

    #[test]
    fn unknown_root_type_fails() {
        let registry = registry(true);
        match compile(&registry, "Nowhere", &parse("city.name")) {
            Err(ConfigurationError::UnknownType { type_name }) => {
                assert_eq!(type_name, "Nowhere");
            }
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn compilation_is_deterministic() {
        let registry = registry(true);
        let a = compile(&registry, "Address", &parse("city.name")).unwrap();
        let b = compile(&registry, "Address", &parse("city.name")).unwrap();
        assert_eq!(a.depth(), b.depth());
        assert_eq!(a.leaf, b.leaf);
        assert_eq!(a.links[0].watched, b.links[0].watched);
    }
}
