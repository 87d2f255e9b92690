//! Error types for depchain.
//!
//! All errors are strongly typed using thiserror. Configuration errors are
//! raised eagerly while a registration is being compiled; notification
//! handling at runtime never produces an error.

use thiserror::Error;

/// Errors raised while compiling a declared dependency path.
///
/// A failing path is a programming error in the declaration table, not a
/// transient condition: construction of a registration is all-or-nothing and
/// the first configuration error aborts the entire `create` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The path contained no usable segment.
    #[error("Dependency path '{path}' is empty or has an empty segment")]
    EmptyPath {
        /// The offending path string.
        path: String,
    },

    /// No type descriptor is registered for the named type.
    #[error("No type descriptor registered for '{type_name}'")]
    UnknownType {
        /// The unregistered type name.
        type_name: String,
    },

    /// A path segment did not resolve to a property on the reachable type.
    #[error("Property '{property}' does not exist on '{type_name}' (path '{path}')")]
    UnresolvedSegment {
        /// The type the segment was resolved against.
        type_name: String,
        /// The segment that failed to resolve.
        property: String,
        /// The full declared path.
        path: String,
    },

    /// An intermediate type cannot raise named change notifications.
    #[error("Type '{type_name}' is not observable but appears mid-path in '{path}'")]
    NotObservable {
        /// The non-observable type.
        type_name: String,
        /// The full declared path.
        path: String,
    },

    /// An intermediate segment resolved to a value property that cannot be
    /// navigated through.
    #[error("Property '{property}' on '{type_name}' is not a reference and cannot be traversed (path '{path}')")]
    NotAReference {
        /// The type declaring the property.
        type_name: String,
        /// The value-kind segment.
        property: String,
        /// The full declared path.
        path: String,
    },

    /// The first path segment names the dependent property itself.
    #[error("Dependent property '{dependent}' depends on itself via path '{path}'")]
    SelfReference {
        /// The dependent property name.
        dependent: String,
        /// The self-referential path.
        path: String,
    },
}

/// Convenience alias for results carrying a [`ConfigurationError`].
pub type ChainResult<T> = Result<T, ConfigurationError>;
