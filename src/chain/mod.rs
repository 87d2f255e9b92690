//! The dependency-chain subsystem.
//!
//! `compiler` turns declared paths into instance-independent chains, `node`
//! holds the per-link subscription state machine, and `registration` owns
//! the bound forest for one root instance.

pub(crate) mod compiler;
pub(crate) mod node;
pub mod registration;

pub use registration::{DependencyCallback, DependencyRegistration};
