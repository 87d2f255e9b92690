//! Dependency registrations: the per-root-instance node forest.
//!
//! `create` discovers the root type's declared `(dependent property, path)`
//! pairs, compiles every path before binding anything (all-or-nothing), then
//! binds one node chain per pair. The registration owns the whole forest;
//! disposing it detaches every subscription and releases the callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::TypeRegistry;
use crate::error::{ChainResult, ConfigurationError};
use crate::observable::ObjectRef;
use crate::path::PropertyPath;

use super::compiler::{compile, Chain};
use super::node::{ChainNode, NotifyFn};

/// Consumer callback, invoked with the dependent property's declared name on
/// whatever thread raised the underlying change notification.
pub type DependencyCallback = Arc<dyn Fn(&str) + Send + Sync>;

struct BoundChain {
    dependent: String,
    path: PropertyPath,
    outermost: Arc<ChainNode>,
}

/// Handle over every dependency chain registered against one root instance.
///
/// Dropping the handle disposes it.
pub struct DependencyRegistration {
    root_type: &'static str,
    chains: Vec<BoundChain>,
    disposed: AtomicBool,
}

impl DependencyRegistration {
    /// Compile and bind every dependency the root's type declares.
    ///
    /// Exactly one callback invocation per declared pair happens before this
    /// returns, whether or not the chain currently resolves to a non-null
    /// leaf.
    ///
    /// # Errors
    ///
    /// The first [`ConfigurationError`] aborts the whole call; no partial
    /// registration is left bound. A path whose first segment names the
    /// dependent property itself is rejected with
    /// [`ConfigurationError::SelfReference`].
    pub fn create(
        registry: &TypeRegistry,
        root: &ObjectRef,
        callback: DependencyCallback,
    ) -> ChainResult<Self> {
        let root_type = root.type_name();
        let descriptor =
            registry
                .get(root_type)
                .ok_or_else(|| ConfigurationError::UnknownType {
                    type_name: root_type.to_string(),
                })?;

        // Compile everything first so a bad declaration binds nothing.
        let mut compiled: Vec<(String, PropertyPath, Chain)> = Vec::new();
        for declaration in descriptor.dependencies() {
            if declaration.path.first() == declaration.dependent {
                return Err(ConfigurationError::SelfReference {
                    dependent: declaration.dependent.clone(),
                    path: declaration.path.to_string(),
                });
            }
            let chain = compile(registry, root_type, &declaration.path)?;
            compiled.push((
                declaration.dependent.clone(),
                declaration.path.clone(),
                chain,
            ));
        }

        let mut chains = Vec::with_capacity(compiled.len());
        for (dependent, path, chain) in compiled {
            let notify: NotifyFn = {
                let callback = Arc::clone(&callback);
                let name = dependent.clone();
                Arc::new(move || callback(&name))
            };
            let outermost = chain.instantiate(&notify);
            outermost.bind(Some(root));
            debug!(dependent = %dependent, path = %path, depth = chain.depth(), "dependency chain bound");
            chains.push(BoundChain {
                dependent,
                path,
                outermost,
            });
        }

        debug!(root_type, chains = chains.len(), "dependency registration created");
        Ok(Self {
            root_type,
            chains,
            disposed: AtomicBool::new(false),
        })
    }

    /// Detach every subscription in the forest and release the callback.
    /// Idempotent; a notification in flight when dispose starts may deliver
    /// once more, but nothing can resubscribe afterwards.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        for chain in &self.chains {
            chain.outermost.dispose();
        }
        debug!(root_type = self.root_type, "dependency registration disposed");
    }

    /// Whether `dispose` has completed at least once.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Number of bound chains (one per declared pair).
    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// The declared `(dependent, path)` pairs this registration bound, in
    /// declaration order.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &PropertyPath)> + '_ {
        self.chains
            .iter()
            .map(|c| (c.dependent.as_str(), &c.path))
    }
}

impl Drop for DependencyRegistration {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for DependencyRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyRegistration")
            .field("root_type", &self.root_type)
            .field("chains", &self.chains.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
