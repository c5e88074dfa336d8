//! Binding registry: recipes, shared instances, aliases and their bookkeeping.

use std::any::Any;
use std::sync::Arc;

use crate::concrete::{Concrete, ConcreteKind};
use crate::container::{Container, ResolverContext};
use crate::error::{DiError, DiResult};
use crate::internal::{Map, Set};
use crate::lifetime::Lifetime;
use crate::parameters::Parameters;

// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Uniform recipe every binding is normalised into.
pub type FactoryFn =
    Arc<dyn Fn(&mut ResolverContext<'_>, &Parameters) -> DiResult<AnyArc> + Send + Sync>;

/// Post-construction transformation registered with `extend`.
pub type ExtenderFn =
    Arc<dyn Fn(AnyArc, &mut ResolverContext<'_>) -> DiResult<AnyArc> + Send + Sync>;

/// Replacement for a `Class@method` call registered with `bind_method`.
pub type MethodBindingFn = Arc<dyn Fn(&AnyArc, &Container) -> DiResult<AnyArc> + Send + Sync>;

/// Registered binding with lifetime and normalised factory
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) factory: FactoryFn,
    pub(crate) lifetime: Lifetime,
    /// What the caller originally registered, for introspection.
    pub(crate) kind: ConcreteKind,
    /// Target key when the recipe was a type name.
    pub(crate) target: Option<String>,
}

impl Binding {
    /// Wraps any recipe into a factory closure.
    ///
    /// A type name equal to the key builds that type; any other type name is
    /// resolved as a further abstract with the caller's parameters, which is
    /// how interface-to-interface chains work.
    pub(crate) fn new(key: &str, concrete: Concrete, lifetime: Lifetime) -> Self {
        let kind = concrete.kind();
        let (factory, target): (FactoryFn, Option<String>) = match concrete {
            Concrete::Factory(factory) => (factory, None),
            Concrete::Type(name) if name == key => {
                let target = name.clone();
                (
                    Arc::new(move |ctx: &mut ResolverContext<'_>, _: &Parameters| {
                        ctx.build_type(&name)
                    }),
                    Some(target),
                )
            }
            Concrete::Type(name) => {
                let target = name.clone();
                (
                    Arc::new(move |ctx: &mut ResolverContext<'_>, params: &Parameters| {
                        ctx.resolve(&name, params.clone())
                    }),
                    Some(target),
                )
            }
            Concrete::Instance(value) => (
                Arc::new(move |_: &mut ResolverContext<'_>, _: &Parameters| Ok(value.clone())),
                None,
            ),
        };

        Self {
            factory,
            lifetime,
            kind,
            target,
        }
    }
}

/// Container state guarded by a single lock
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) bindings: Map<String, Binding>,
    pub(crate) instances: Map<String, AnyArc>,
    /// alias -> abstract
    pub(crate) aliases: Map<String, String>,
    /// abstract -> aliases pointing at it
    pub(crate) abstract_aliases: Map<String, Vec<String>>,
    pub(crate) resolved: Set<String>,
    pub(crate) extenders: Map<String, Vec<ExtenderFn>>,
    pub(crate) tags: Map<String, Vec<String>>,
    /// concrete under construction -> needed key -> override
    pub(crate) contextual: Map<String, Map<String, Concrete>>,
    pub(crate) method_bindings: Map<String, MethodBindingFn>,
}

impl Registry {
    /// Follows the alias chain to the canonical key.
    pub(crate) fn get_alias(&self, key: &str) -> DiResult<String> {
        let mut current = key;
        let mut seen: Vec<&str> = Vec::new();
        while let Some(target) = self.aliases.get(current) {
            if target == current || target == key || seen.contains(&target.as_str()) {
                return Err(DiError::SelfAlias(key.to_string()));
            }
            seen.push(current);
            current = target;
        }
        Ok(current.to_string())
    }

    pub(crate) fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Binding, instance or alias registered under `key` (not canonicalised).
    pub(crate) fn bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key) || self.instances.contains_key(key) || self.is_alias(key)
    }

    pub(crate) fn resolved(&self, key: &str) -> DiResult<bool> {
        let key = if self.is_alias(key) {
            self.get_alias(key)?
        } else {
            key.to_string()
        };
        Ok(self.resolved.contains(&key) || self.instances.contains_key(&key))
    }

    pub(crate) fn is_shared(&self, key: &str) -> bool {
        self.instances.contains_key(key)
            || self
                .bindings
                .get(key)
                .map(|b| b.lifetime.is_shared())
                .unwrap_or(false)
    }

    /// Drops a cached instance and alias that a fresh binding would shadow.
    pub(crate) fn drop_stale_instances(&mut self, key: &str) {
        self.instances.remove(key);
        self.aliases.remove(key);
    }

    /// Removes `alias` from every abstract's alias list.
    pub(crate) fn remove_abstract_alias(&mut self, alias: &str) {
        if !self.is_alias(alias) {
            return;
        }
        for aliases in self.abstract_aliases.values_mut() {
            aliases.retain(|a| a != alias);
        }
    }

    /// Contextual override for `key` while `concrete` is being built,
    /// falling back to the aliases of `key`.
    pub(crate) fn contextual_for(&self, concrete: &str, key: &str) -> Option<Concrete> {
        let overrides = self.contextual.get(concrete)?;
        if let Some(found) = overrides.get(key) {
            return Some(found.clone());
        }
        self.abstract_aliases
            .get(key)?
            .iter()
            .find_map(|alias| overrides.get(alias).cloned())
    }

    pub(crate) fn extenders(&self, key: &str) -> Vec<ExtenderFn> {
        self.extenders.get(key).cloned().unwrap_or_default()
    }

    pub(crate) fn flush(&mut self) {
        self.aliases.clear();
        self.abstract_aliases.clear();
        self.resolved.clear();
        self.bindings.clear();
        self.instances.clear();
        self.extenders.clear();
        self.tags.clear();
        self.contextual.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_chains_are_followed() {
        let mut registry = Registry::default();
        registry.aliases.insert("a".into(), "b".into());
        registry.aliases.insert("b".into(), "c".into());
        assert_eq!(registry.get_alias("a").unwrap(), "c");
        assert_eq!(registry.get_alias("c").unwrap(), "c");
    }

    #[test]
    fn alias_cycles_are_rejected() {
        let mut registry = Registry::default();
        registry.aliases.insert("a".into(), "b".into());
        registry.aliases.insert("b".into(), "a".into());
        assert!(matches!(registry.get_alias("a"), Err(DiError::SelfAlias(k)) if k == "a"));

        registry.aliases.insert("c".into(), "c".into());
        assert!(matches!(registry.get_alias("c"), Err(DiError::SelfAlias(_))));
    }

    #[test]
    fn contextual_lookup_falls_back_to_aliases() {
        let mut registry = Registry::default();
        registry
            .abstract_aliases
            .insert("Cache".into(), vec!["cache".into()]);
        let mut overrides = Map::default();
        overrides.insert("cache".to_string(), Concrete::Type("RedisCache".into()));
        registry.contextual.insert("Controller".into(), overrides);

        let found = registry.contextual_for("Controller", "Cache");
        assert!(matches!(found, Some(Concrete::Type(name)) if name == "RedisCache"));
        assert!(registry.contextual_for("Other", "Cache").is_none());
    }
}
