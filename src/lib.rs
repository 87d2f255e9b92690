//! # depchain - dependency-chain property observation
//!
//! depchain lets an object expose a dependent (computed) property derived
//! from a chain of nested observable properties (`root.address.city.name`)
//! and be told whenever any link of that chain changes - including an
//! intermediate link being replaced wholesale - without re-subscribing at
//! every level by hand.
//!
//! ## Core Concepts
//!
//! - **ObservableObject**: a type that raises named property-change
//!   notifications through an embedded [`ChangeNotifier`]
//! - **TypeRegistry**: the explicit declaration table - properties,
//!   accessors, and `(dependent property, path)` pairs per type
//! - **Chain**: the compiled, instance-independent form of a dotted path
//! - **DependencyRegistration**: the bound node forest for one root
//!   instance, with an all-or-nothing `create` and idempotent `dispose`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use depchain::{DependencyRegistration, TypeDescriptor, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     TypeDescriptor::builder("Profile")
//!         .observable()
//!         .reference_property("address", "Address", address_accessor())
//!         .value_property("display_name")
//!         .depends_on("display_name", "address.city")
//!         .build()?,
//! );
//!
//! let registration = DependencyRegistration::create(
//!     &registry,
//!     &profile,
//!     Arc::new(|dependent| println!("{dependent} may have changed")),
//! )?;
//! // ... setters on profile/address now drive the callback ...
//! registration.dispose();
//! ```
//!
//! Callbacks run synchronously on the thread that raised the change; the
//! crate introduces no threads, timers, or batching of its own.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accessor;
pub mod chain;
pub mod descriptor;
pub mod error;
pub mod observable;
pub mod path;

// Re-export primary types at crate root for convenience
pub use accessor::{make_accessor, reference_accessor, Accessor};
pub use chain::{DependencyCallback, DependencyRegistration};
pub use descriptor::{
    DependencyDescriptor, PropertyDescriptor, PropertyKind, TypeDescriptor, TypeDescriptorBuilder,
    TypeRegistry,
};
pub use error::{ChainResult, ConfigurationError};
pub use observable::{ChangeNotifier, Listener, ListenerId, ObjectRef, ObservableObject};
pub use path::PropertyPath;
