//! The service container.
//!
//! [`Container`] owns the binding registry, alias table, contextual binding
//! map, instance cache, type table and callback registry. Every resolution
//! runs inside a fresh [`ResolverContext`] that carries the build stack and
//! parameter frames for that call tree only.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::callbacks::{CallbackFn, CallbackRegistry, Phase, ReboundFn};
use crate::concrete::Concrete;
use crate::config::ContainerConfig;
use crate::constructor::{Constructor, Injectable, TypeTable};
use crate::descriptors::BindingDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::{BuildLock, Map};
use crate::key::key_of;
use crate::lifetime::Lifetime;
use crate::parameters::{downcast, downcast_trait, Parameters};
use crate::registration::{AnyArc, Binding, ExtenderFn, Registry};

mod context;
mod contextual;
mod invoke;
mod resolve;

pub use context::ResolverContext;
pub use contextual::{ContextualBindingBuilder, ContextualNeeds};
pub use invoke::CallTarget;

pub(crate) struct ContainerInner {
    pub(crate) registry: RwLock<Registry>,
    pub(crate) types: RwLock<TypeTable>,
    pub(crate) callbacks: RwLock<CallbackRegistry>,
    build_locks: Mutex<Map<String, Arc<BuildLock>>>,
    config: ContainerConfig,
}

/// Dependency-resolution container.
///
/// Cloning is cheap: clones share the same registry, instance cache and
/// callbacks. Registry locks are released before user factories, extenders
/// or callbacks run, so they may re-enter the container. A shared abstract
/// is built under its own per-key lock; re-entering that abstract from the
/// thread building it fails with [`DiError::Circular`].
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Concrete, Constructor, Container, Parameter, Parameters};
/// use std::sync::Arc;
///
/// struct FileStore { root: String }
/// struct Uploader { store: Arc<FileStore> }
///
/// let container = Container::new();
/// container.register_type(Constructor::interface("Store"));
/// container.register_type(
///     Constructor::of::<FileStore>()
///         .implements("Store")
///         .param(Parameter::primitive("root").default("/tmp".to_string()))
///         .construct(|args| Ok(FileStore { root: args.get_cloned("root")? })),
/// );
/// container.register_type(
///     Constructor::named("Uploader")
///         .param(Parameter::class("store", "Store"))
///         .construct(|args| Ok(Uploader { store: args.get("store")? })),
/// );
///
/// container.singleton("Store", Concrete::type_of::<FileStore>()).unwrap();
///
/// let uploader: Arc<Uploader> = container.make_as("Uploader").unwrap();
/// assert_eq!(uploader.store.root, "/tmp");
///
/// // Parameters force a one-off build that bypasses the shared cache
/// let custom = container
///     .make_with("Store", Parameters::new().with("root", "/srv".to_string()))
///     .unwrap()
///     .downcast::<FileStore>()
///     .unwrap();
/// assert_eq!(custom.root, "/srv");
///
/// let shared: Arc<FileStore> = container.make_as("Store").unwrap();
/// assert!(Arc::ptr_eq(&shared, &uploader.store));
/// ```
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: RwLock::new(Registry::default()),
                types: RwLock::new(TypeTable::default()),
                callbacks: RwLock::new(CallbackRegistry::default()),
                build_locks: Mutex::new(Map::default()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    pub(crate) fn context(&self) -> ResolverContext<'_> {
        ResolverContext::new(self)
    }

    pub(crate) fn build_lock(&self, key: &str) -> Arc<BuildLock> {
        self.inner
            .build_locks
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    // ----- Type table -----

    /// Registers a constructor descriptor, replacing any previous one of the
    /// same name.
    pub fn register_type(&self, ctor: Constructor) {
        tracing::debug!(concrete = %ctor.name(), params = ctor.parameters().len(), "registering constructor");
        self.inner.types.write().register(ctor);
    }

    /// Registers the constructor an [`Injectable`] type describes.
    pub fn register<T: Injectable>(&self) {
        self.register_type(T::constructor());
    }

    /// True if a constructor is registered under `name`.
    pub fn has_type(&self, name: &str) -> bool {
        self.inner.types.read().contains(name)
    }

    // ----- Registration -----

    /// Registers or replaces the binding for `key`.
    ///
    /// Any cached instance or alias under `key` is dropped first. If `key`
    /// had already been resolved, rebound listeners fire with a fresh
    /// instance, and their resolution errors are returned.
    pub fn bind(&self, key: &str, concrete: impl Into<Concrete>, shared: bool) -> DiResult<()> {
        let concrete = concrete.into();
        let lifetime = Lifetime::from(shared);
        tracing::debug!(key = %key, kind = ?concrete.kind(), ?lifetime, "binding");

        let resolved = {
            let mut registry = self.inner.registry.write();
            registry.drop_stale_instances(key);
            registry
                .bindings
                .insert(key.to_string(), Binding::new(key, concrete, lifetime));
            registry.resolved(key)?
        };

        if resolved {
            self.rebound(key)?;
        }
        Ok(())
    }

    /// Binds only if `key` has no binding, instance or alias yet.
    pub fn bind_if(&self, key: &str, concrete: impl Into<Concrete>, shared: bool) -> DiResult<()> {
        if !self.bound(key) {
            self.bind(key, concrete, shared)?;
        }
        Ok(())
    }

    /// `bind` with a shared lifetime.
    pub fn singleton(&self, key: &str, concrete: impl Into<Concrete>) -> DiResult<()> {
        self.bind(key, concrete, true)
    }

    /// Registers a prebuilt shared instance and returns it.
    pub fn instance<T: Send + Sync + 'static>(&self, key: &str, value: T) -> DiResult<Arc<T>> {
        let value = Arc::new(value);
        self.instance_arc(key, value.clone())?;
        Ok(value)
    }

    /// Registers an already type-erased shared instance.
    pub fn instance_arc(&self, key: &str, value: AnyArc) -> DiResult<AnyArc> {
        tracing::debug!(key = %key, "registering instance");
        let was_bound = {
            let mut registry = self.inner.registry.write();
            registry.remove_abstract_alias(key);
            let was_bound = registry.bound(key);
            registry.aliases.remove(key);
            registry.instances.insert(key.to_string(), value.clone());
            was_bound
        };

        if was_bound {
            self.rebound(key)?;
        }
        Ok(value)
    }

    /// Registers a post-construction transformation.
    ///
    /// A cached shared instance is transformed immediately; otherwise the
    /// extender runs on every future build of `key`.
    pub fn extend<F>(&self, key: &str, extender: F) -> DiResult<()>
    where
        F: Fn(AnyArc, &mut ResolverContext<'_>) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        let extender: ExtenderFn = Arc::new(extender);
        let key = self.get_alias(key)?;

        let cached = self.inner.registry.read().instances.get(&key).cloned();
        match cached {
            Some(instance) => {
                tracing::debug!(key = %key, "extending cached instance");
                let extended = extender(instance, &mut self.context())?;
                self.inner
                    .registry
                    .write()
                    .instances
                    .insert(key.clone(), extended);
                self.rebound(&key)
            }
            None => {
                tracing::debug!(key = %key, "queueing extender");
                let resolved = {
                    let mut registry = self.inner.registry.write();
                    registry.extenders.entry(key.clone()).or_default().push(extender);
                    registry.resolved(&key)?
                };
                if resolved {
                    self.rebound(&key)?;
                }
                Ok(())
            }
        }
    }

    /// Typed form of [`extend`](Self::extend): receives the instance as
    /// `Arc<T>` and replaces it with the returned value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_container::{Concrete, Container};
    ///
    /// let container = Container::new();
    /// container.singleton("greeting", Concrete::value("hello".to_string())).unwrap();
    /// container
    ///     .extend_typed::<String, String, _>("greeting", |s, _| Ok(format!("{s}, world")))
    ///     .unwrap();
    ///
    /// assert_eq!(*container.make_as::<String>("greeting").unwrap(), "hello, world");
    /// ```
    pub fn extend_typed<T, R, F>(&self, key: &str, extender: F) -> DiResult<()>
    where
        T: Send + Sync + 'static,
        R: Send + Sync + 'static,
        F: Fn(Arc<T>, &mut ResolverContext<'_>) -> DiResult<R> + Send + Sync + 'static,
    {
        let owner = key.to_string();
        self.extend(key, move |instance, ctx| {
            let typed = downcast::<T>(&owner, instance)?;
            Ok(Arc::new(extender(typed, ctx)?) as AnyArc)
        })
    }

    /// Makes `alias` resolve to `key`.
    pub fn alias(&self, key: &str, alias: &str) -> DiResult<()> {
        if alias == key {
            return Err(DiError::SelfAlias(key.to_string()));
        }
        tracing::debug!(key = %key, alias = %alias, "aliasing");

        let mut registry = self.inner.registry.write();
        registry.aliases.insert(alias.to_string(), key.to_string());
        registry
            .abstract_aliases
            .entry(key.to_string())
            .or_default()
            .push(alias.to_string());
        Ok(())
    }

    /// Assigns every abstract in `keys` to every tag in `tags`.
    pub fn tag(&self, keys: &[&str], tags: &[&str]) {
        let mut registry = self.inner.registry.write();
        for tag in tags {
            let entry = registry.tags.entry(tag.to_string()).or_default();
            entry.extend(keys.iter().map(|k| k.to_string()));
        }
    }

    /// Resolves every abstract tagged with `tag`, in tagging order.
    pub fn tagged(&self, tag: &str) -> DiResult<Vec<AnyArc>> {
        let keys = self
            .inner
            .registry
            .read()
            .tags
            .get(tag)
            .cloned()
            .unwrap_or_default();
        keys.iter().map(|key| self.make(key)).collect()
    }

    /// Registers a listener for when `key` is rebound after being resolved.
    ///
    /// Returns the current instance when `key` is already bound.
    pub fn rebinding<F>(&self, key: &str, callback: F) -> DiResult<Option<AnyArc>>
    where
        F: Fn(&Container, &AnyArc) + Send + Sync + 'static,
    {
        let key = self.get_alias(key)?;
        let callback: ReboundFn = Arc::new(callback);
        self.inner.callbacks.write().add_rebound(key.clone(), callback);

        if self.bound(&key) {
            return self.make(&key).map(Some);
        }
        Ok(None)
    }

    /// Pushes each fresh instance of `key` into `target` through `method`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_container::{Concrete, Container};
    /// use parking_lot::Mutex;
    /// use std::sync::Arc;
    ///
    /// struct Mailer { transport: Mutex<String> }
    ///
    /// let container = Container::new();
    /// container.bind("transport", Concrete::value("smtp".to_string()), false).unwrap();
    ///
    /// let mailer = Arc::new(Mailer { transport: Mutex::new(String::new()) });
    /// container
    ///     .refresh("transport", mailer.clone(), |m: &Mailer, t| {
    ///         if let Some(t) = t.downcast_ref::<String>() {
    ///             *m.transport.lock() = t.clone();
    ///         }
    ///     })
    ///     .unwrap();
    ///
    /// container.bind("transport", Concrete::value("ses".to_string()), false).unwrap();
    /// assert_eq!(*mailer.transport.lock(), "ses");
    /// ```
    pub fn refresh<T, F>(&self, key: &str, target: Arc<T>, method: F) -> DiResult<Option<AnyArc>>
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &AnyArc) + Send + Sync + 'static,
    {
        self.rebinding(key, move |_, instance| method(&target, instance))
    }

    fn rebound(&self, key: &str) -> DiResult<()> {
        let instance = self.make(key)?;
        let callbacks = self.inner.callbacks.read().rebound_for(key);
        tracing::debug!(key = %key, listeners = callbacks.len(), "rebound");
        for callback in callbacks {
            callback(self, &instance);
        }
        Ok(())
    }

    // ----- Resolution callbacks -----

    /// Listener fired when `key` (or an instance of the type `key`) is
    /// resolved.
    pub fn resolving<F>(&self, key: &str, callback: F) -> DiResult<()>
    where
        F: Fn(&AnyArc, &mut ResolverContext<'_>) + Send + Sync + 'static,
    {
        self.add_callback(Phase::Resolving, Some(key), Arc::new(callback))
    }

    /// Listener fired for every resolution.
    pub fn resolving_any<F>(&self, callback: F)
    where
        F: Fn(&AnyArc, &mut ResolverContext<'_>) + Send + Sync + 'static,
    {
        self.inner
            .callbacks
            .write()
            .add(Phase::Resolving, None, Arc::new(callback));
    }

    pub fn after_resolving<F>(&self, key: &str, callback: F) -> DiResult<()>
    where
        F: Fn(&AnyArc, &mut ResolverContext<'_>) + Send + Sync + 'static,
    {
        self.add_callback(Phase::AfterResolving, Some(key), Arc::new(callback))
    }

    pub fn after_resolving_any<F>(&self, callback: F)
    where
        F: Fn(&AnyArc, &mut ResolverContext<'_>) + Send + Sync + 'static,
    {
        self.inner
            .callbacks
            .write()
            .add(Phase::AfterResolving, None, Arc::new(callback));
    }

    fn add_callback(&self, phase: Phase, key: Option<&str>, callback: CallbackFn) -> DiResult<()> {
        let key = key.map(|k| self.get_alias(k)).transpose()?;
        self.inner.callbacks.write().add(phase, key, callback);
        Ok(())
    }

    // ----- Queries -----

    /// True if `key` has a binding, a shared instance or is an alias.
    pub fn bound(&self, key: &str) -> bool {
        self.inner.registry.read().bound(key)
    }

    /// Same as [`bound`](Self::bound).
    pub fn has(&self, key: &str) -> bool {
        self.bound(key)
    }

    /// True if `key` has been resolved at least once or holds an instance.
    pub fn resolved(&self, key: &str) -> bool {
        self.inner.registry.read().resolved(key).unwrap_or(false)
    }

    pub fn is_shared(&self, key: &str) -> bool {
        self.inner.registry.read().is_shared(key)
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.inner.registry.read().is_alias(name)
    }

    /// Canonical abstract behind `key`.
    pub fn get_alias(&self, key: &str) -> DiResult<String> {
        self.inner.registry.read().get_alias(key)
    }

    /// Registered bindings, sorted by key.
    pub fn get_bindings(&self) -> Vec<BindingDescriptor> {
        let registry = self.inner.registry.read();
        let mut out: Vec<BindingDescriptor> = registry
            .bindings
            .iter()
            .map(|(key, binding)| BindingDescriptor {
                key: key.clone(),
                lifetime: binding.lifetime,
                kind: binding.kind,
                target: binding.target.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    // ----- Map-style access -----

    /// Resolves `id` only if it is bound, else fails with `NotFound`.
    pub fn get(&self, id: &str) -> DiResult<AnyArc> {
        if self.has(id) {
            return self.make(id);
        }
        Err(DiError::NotFound(id.to_string()))
    }

    /// Binds a non-shared recipe that hands out `value`.
    pub fn set<T: Send + Sync + 'static>(&self, key: &str, value: T) -> DiResult<()> {
        self.bind(key, Concrete::value(value), false)
    }

    /// Drops the binding, instance and resolved flag of `key`.
    pub fn unset(&self, key: &str) {
        let mut registry = self.inner.registry.write();
        registry.bindings.remove(key);
        registry.instances.remove(key);
        registry.resolved.remove(key);
    }

    // ----- Forgetting -----

    pub fn forget_extenders(&self, key: &str) -> DiResult<()> {
        let key = self.get_alias(key)?;
        self.inner.registry.write().extenders.remove(&key);
        Ok(())
    }

    pub fn forget_instance(&self, key: &str) {
        self.inner.registry.write().instances.remove(key);
    }

    pub fn forget_instances(&self) {
        self.inner.registry.write().instances.clear();
    }

    /// Drops all bindings, instances, aliases, extenders, tags, contextual
    /// bindings and resolved flags. Constructors and callbacks are kept.
    pub fn flush(&self) {
        tracing::debug!("flushing container");
        self.inner.registry.write().flush();
        self.inner.build_locks.lock().clear();
    }

    // ----- Resolution -----

    /// Resolves `key`.
    pub fn make(&self, key: &str) -> DiResult<AnyArc> {
        self.make_with(key, Parameters::new())
    }

    /// Resolves `key` with parameter overrides. Non-empty parameters always
    /// build a fresh, uncached instance.
    pub fn make_with(&self, key: &str, parameters: Parameters) -> DiResult<AnyArc> {
        self.context().resolve(key, parameters)
    }

    /// Resolves `key` and downcasts to `T`.
    pub fn make_as<T: Send + Sync + 'static>(&self, key: &str) -> DiResult<Arc<T>> {
        downcast(key, self.make(key)?)
    }

    /// Resolves the Rust type `T`, registering its constructor on first use.
    pub fn make_type<T: Injectable>(&self) -> DiResult<Arc<T>> {
        let key = key_of::<T>();
        if !self.has_type(&key) {
            self.register::<T>();
        }
        self.make_as(&key)
    }

    /// Resolves a trait-object service stored as `Arc<Arc<dyn Trait>>`.
    pub fn make_trait<T: ?Sized + Send + Sync + 'static>(&self, key: &str) -> DiResult<Arc<T>> {
        downcast_trait(key, self.make(key)?)
    }

    /// Closure resolving `key` on each call.
    pub fn factory(&self, key: &str) -> impl Fn() -> DiResult<AnyArc> + Send + Sync + 'static {
        let container = self.clone();
        let key = key.to_string();
        move || container.make(&key)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.read();
        f.debug_struct("Container")
            .field("bindings", &registry.bindings.len())
            .field("instances", &registry.instances.len())
            .field("aliases", &registry.aliases.len())
            .field("config", &self.inner.config)
            .finish()
    }
}
