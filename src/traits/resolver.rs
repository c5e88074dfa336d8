//! Resolver traits shared by the container and resolution contexts.

use std::sync::Arc;

use crate::constructor::Injectable;
use crate::container::Container;
use crate::error::DiResult;
use crate::key::key_of;
use crate::parameters::{downcast, downcast_trait, Parameters};
use crate::registration::AnyArc;

/// Object-safe resolution entry point.
///
/// Implemented by [`Container`], which starts a fresh resolution, and by
/// [`ResolverContext`](crate::ResolverContext), which resolves inside the
/// call tree it belongs to so that contextual bindings and cycle detection
/// see the enclosing build frames.
pub trait ResolverCore {
    /// Resolves `key` with the given parameter overrides.
    fn resolve_any(&mut self, key: &str, parameters: Parameters) -> DiResult<AnyArc>;

    /// Container backing this resolver.
    fn container(&self) -> &Container;
}

/// Typed resolution helpers built on [`ResolverCore`].
///
/// Inside factories and callbacks, use these on the provided context rather
/// than on the container handle: a nested `container.make` starts a new call
/// tree and loses the enclosing build frame.
///
/// # Examples
///
/// ```
/// use ferrous_container::{Concrete, Container, Resolver};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { 1_700_000_000 }
/// }
///
/// let container = Container::new();
/// container
///     .singleton("clock", Concrete::value(Arc::new(FixedClock) as Arc<dyn Clock>))
///     .unwrap();
/// container
///     .bind("stamp", Concrete::factory(|ctx, _| {
///         let clock = ctx.make_trait::<dyn Clock>("clock")?;
///         Ok(clock.now())
///     }), false)
///     .unwrap();
///
/// assert_eq!(*container.make_as::<u64>("stamp").unwrap(), 1_700_000_000);
/// ```
pub trait Resolver: ResolverCore {
    fn make(&mut self, key: &str) -> DiResult<AnyArc> {
        self.resolve_any(key, Parameters::new())
    }

    fn make_with(&mut self, key: &str, parameters: Parameters) -> DiResult<AnyArc> {
        self.resolve_any(key, parameters)
    }

    /// Resolves `key` and downcasts to `T`.
    fn make_as<T: Send + Sync + 'static>(&mut self, key: &str) -> DiResult<Arc<T>> {
        let any = self.resolve_any(key, Parameters::new())?;
        downcast(key, any)
    }

    /// Resolves the Rust type `T`, registering its constructor on first use.
    fn make_type<T: Injectable>(&mut self) -> DiResult<Arc<T>> {
        let key = key_of::<T>();
        if !self.container().has_type(&key) {
            self.container().register::<T>();
        }
        self.make_as(&key)
    }

    /// Resolves a trait-object service stored as `Arc<Arc<dyn Trait>>`.
    fn make_trait<T: ?Sized + Send + Sync + 'static>(&mut self, key: &str) -> DiResult<Arc<T>> {
        let any = self.resolve_any(key, Parameters::new())?;
        downcast_trait(key, any)
    }
}

impl ResolverCore for Container {
    fn resolve_any(&mut self, key: &str, parameters: Parameters) -> DiResult<AnyArc> {
        Container::make_with(self, key, parameters)
    }

    fn container(&self) -> &Container {
        self
    }
}

impl Resolver for Container {}
