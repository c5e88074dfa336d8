//! Binding descriptors for introspection and diagnostics.

use crate::concrete::ConcreteKind;
use crate::lifetime::Lifetime;

/// Snapshot of one registered binding, as returned by
/// [`Container::get_bindings`](crate::Container::get_bindings).
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Concrete, ConcreteKind, Container, Lifetime};
///
/// let container = Container::new();
/// container.singleton("cache", "RedisCache").unwrap();
/// container.bind("clock", Concrete::factory(|_, _| Ok(0u64)), false).unwrap();
///
/// let bindings = container.get_bindings();
/// assert_eq!(bindings.len(), 2);
///
/// let cache = &bindings[0];
/// assert_eq!(cache.key, "cache");
/// assert_eq!(cache.lifetime, Lifetime::Shared);
/// assert_eq!(cache.kind, ConcreteKind::Type);
/// assert_eq!(cache.target.as_deref(), Some("RedisCache"));
///
/// assert!(!bindings[1].is_shared());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    /// Abstract the binding is registered under.
    pub key: String,
    pub lifetime: Lifetime,
    /// Kind of recipe that was registered.
    pub kind: ConcreteKind,
    /// Type or abstract the recipe names, for `Type` recipes.
    pub target: Option<String>,
}

impl BindingDescriptor {
    pub fn is_shared(&self) -> bool {
        self.lifetime.is_shared()
    }
}
